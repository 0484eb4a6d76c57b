//! product-viewer
//!
//! An interactive 3D product-customization viewer for native windows and the
//! web. A static OBJ/MTL model is loaded once in the background; the user
//! switches its surface between a flat colour and a fixed set of texture
//! swatches while a continuous render loop draws it under an orbit camera.
//!
//! High-level modules
//! - `appearance`: appearance selection, texture catalog and material resolution
//! - `camera`: orbit camera state, pointer controller, projection and uniforms
//! - `config`: startup configuration of the viewer
//! - `context`: central GPU and window context that owns device/queue/pipeline
//! - `data_structures`: the loaded object tree and GPU textures
//! - `error`: load, draw and parse errors
//! - `flow`: the render loop and the winit application driving it
//! - `pipelines`: the render pipeline mesh nodes are drawn with
//! - `render`: GPU mirror of the loaded object and the window draw target
//! - `resources`: asset stores and the OBJ/MTL loader
//! - `scene`: the scene state every user action mutates
//!

pub mod appearance;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use appearance::{AppearanceSelection, TextureCatalog};
pub use config::ViewerConfig;
pub use data_structures::model::{MaterialAssignment, RenderableObject, Rgb};
pub use flow::{ViewerCommand, ViewerHandle, run};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    run(ViewerConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
