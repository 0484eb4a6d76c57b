//! Scene state: the single owner of everything the user can change.
//!
//! Mutations are synchronous and only mark the appearance as changed; the
//! render loop resolves it at the start of its next cycle. Several changes in
//! between collapse into one resolution of the latest selection.

use crate::{
    appearance::{self, AppearanceSelection, Resolution, TextureCatalog},
    camera::CameraState,
    config::ViewerConfig,
    data_structures::model::{RenderableObject, Rgb},
};

#[derive(Debug)]
pub struct SceneState {
    selection: AppearanceSelection,
    last_color: Rgb,
    auxiliary_texture: Option<String>,
    object: Option<RenderableObject>,
    camera: CameraState,
    panel_open: bool,
    color_picker_open: bool,
    appearance_changed: bool,
}

impl SceneState {
    pub fn new(initial_color: Rgb, camera: CameraState) -> Self {
        Self {
            selection: AppearanceSelection::SolidColor(initial_color),
            last_color: initial_color,
            auxiliary_texture: None,
            object: None,
            camera,
            panel_open: true,
            color_picker_open: false,
            appearance_changed: true,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut state = Self::new(config.initial_color, CameraState::from_config(&config.camera));
        state.auxiliary_texture = config.auxiliary_texture.clone();
        state
    }

    pub fn selection(&self) -> &AppearanceSelection {
        &self.selection
    }

    /// The most recent solid colour, kept while a swatch is selected.
    pub fn last_color(&self) -> Rgb {
        self.last_color
    }

    pub fn set_appearance_color(&mut self, color: Rgb) {
        self.selection = AppearanceSelection::SolidColor(color);
        self.last_color = color;
        self.color_picker_open = false;
        self.appearance_changed = true;
    }

    pub fn set_appearance_texture(&mut self, id: impl Into<String>) {
        self.selection = AppearanceSelection::NamedTexture(id.into());
        self.appearance_changed = true;
    }

    /// Presentation-only; has no effect on rendering.
    pub fn toggle_auxiliary_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn toggle_color_picker(&mut self) {
        self.color_picker_open = !self.color_picker_open;
    }

    pub fn is_color_picker_open(&self) -> bool {
        self.color_picker_open
    }

    pub fn auxiliary_texture(&self) -> Option<&str> {
        self.auxiliary_texture.as_deref()
    }

    /// Per-object texture laid over flat colours. Nothing in the stock UI sets it.
    pub fn set_auxiliary_texture(&mut self, image: Option<String>) {
        self.auxiliary_texture = image;
        self.appearance_changed = true;
    }

    /// Hand the loaded object to the scene. From now on the scene is ready.
    pub fn attach(&mut self, object: RenderableObject) {
        if self.object.is_some() {
            log::warn!("Replacing an already attached object");
        }
        log::info!("Attached object with {} mesh nodes", object.mesh_count());
        self.object = Some(object);
        self.appearance_changed = true;
    }

    pub fn is_ready(&self) -> bool {
        self.object.is_some()
    }

    pub fn object(&self) -> Option<&RenderableObject> {
        self.object.as_ref()
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    pub fn has_appearance_change(&self) -> bool {
        self.appearance_changed
    }

    pub(crate) fn take_appearance_change(&mut self) -> bool {
        std::mem::take(&mut self.appearance_changed)
    }

    /// Resolve the current selection onto the attached object, if any.
    pub fn resolve_appearance(&mut self, catalog: &TextureCatalog) -> Resolution {
        match self.object.as_mut() {
            Some(object) => Resolution::Applied {
                meshes: appearance::resolve(
                    object,
                    &self.selection,
                    self.last_color,
                    self.auxiliary_texture.as_deref(),
                    catalog,
                ),
            },
            None => Resolution::Skipped,
        }
    }
}
