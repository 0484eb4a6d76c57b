//! Viewer data structures: the loaded object tree and GPU textures.
//!
//! - `model` contains the renderable object tree, mesh nodes and material assignments
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod model;
pub mod texture;
