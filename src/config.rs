//! Viewer configuration.
//!
//! Everything here is fixed at startup. [`ViewerConfig::default`] describes the
//! stock product page: the `untitled` box model, the carton and blanc swatches
//! and a pale grey background.

use std::path::PathBuf;

use crate::{appearance::TextureCatalog, data_structures::model::Rgb};

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Distance from the orbit target at startup.
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of pointer drag.
    pub rotate_speed: f32,
    /// Distance change per scroll line, relative to the current distance.
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 100.0,
            distance: 5.0,
            min_distance: 0.5,
            max_distance: 50.0,
            rotate_speed: 0.01,
            zoom_speed: 0.1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    /// Directory the native file store reads from. Defaults to the copy the
    /// build script places in `OUT_DIR`.
    pub assets_root: PathBuf,
    pub geometry: String,
    pub materials: String,
    pub catalog: TextureCatalog,
    pub initial_color: Rgb,
    /// Background colour; re-asserted on every frame.
    pub clear_colour: Rgb,
    pub auxiliary_texture: Option<String>,
    /// Colours the `C` key cycles through.
    pub palette: Vec<Rgb>,
    pub camera: CameraConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let initial_color = Rgb::new(0x95, 0xc2, 0x8c);
        Self {
            title: "Product viewer".to_string(),
            assets_root: PathBuf::from(concat!(env!("OUT_DIR"), "/assets")),
            geometry: "untitled.obj".to_string(),
            materials: "untitled.mtl".to_string(),
            catalog: TextureCatalog::product_swatches(),
            initial_color,
            clear_colour: Rgb::new(0xf4, 0xf3, 0xf2),
            auxiliary_texture: None,
            palette: vec![
                initial_color,
                Rgb::new(0xc2, 0x8c, 0x95),
                Rgb::new(0x8c, 0x95, 0xc2),
                Rgb::new(0xe8, 0xd1, 0x8a),
                Rgb::new(0x3b, 0x3b, 0x3b),
            ],
            camera: CameraConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = root.into();
        self
    }

    pub fn with_model(mut self, geometry: &str, materials: &str) -> Self {
        self.geometry = geometry.to_string();
        self.materials = materials.to_string();
        self
    }

    pub fn with_catalog(mut self, catalog: TextureCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_initial_color(mut self, color: Rgb) -> Self {
        self.initial_color = color;
        self
    }

    pub fn with_clear_colour(mut self, color: Rgb) -> Self {
        self.clear_colour = color;
        self
    }

    pub fn with_auxiliary_texture(mut self, image: &str) -> Self {
        self.auxiliary_texture = Some(image.to_string());
        self
    }

    /// Every image the session may bind: catalog swatches plus the auxiliary texture.
    pub fn image_sources(&self) -> Vec<String> {
        let mut images: Vec<String> = self.catalog.images().map(str::to_string).collect();
        if let Some(aux) = &self.auxiliary_texture {
            if !images.contains(aux) {
                images.push(aux.clone());
            }
        }
        images
    }
}
