//! Appearance selection and resolution.
//!
//! The user picks exactly one visual treatment at a time: a flat colour or one
//! of the swatches in the [`TextureCatalog`]. [`resolve`] turns that selection
//! into a [`MaterialAssignment`] on every mesh node of the loaded object. The
//! assignment is recomputed from scratch each time, never patched, so calling
//! it again with the same inputs changes nothing.

use std::collections::BTreeMap;

use crate::data_structures::model::{MaterialAssignment, RenderableObject, Rgb};

/// The single active visual treatment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppearanceSelection {
    SolidColor(Rgb),
    NamedTexture(String),
}

/// Fixed mapping from swatch id to image asset, built once at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureCatalog {
    entries: BTreeMap<String, String>,
}

impl TextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The swatches offered on the product page.
    pub fn product_swatches() -> Self {
        Self::new()
            .with("carton", "carton.png")
            .with("blanc", "blanc.png")
    }

    pub fn with(mut self, id: &str, image: &str) -> Self {
        self.entries.insert(id.to_string(), image.to_string());
        self
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Swatch ids in a stable (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TextureCatalog {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(id, image)| (id.into(), image.into()))
                .collect(),
        }
    }
}

/// Outcome of a resolution request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Applied { meshes: usize },
    /// The object is not attached yet. Not an error.
    Skipped,
}

/// The material every mesh node gets for `selection`.
///
/// A catalog swatch is drawn untinted. Anything else is a flat colour with the
/// optional per-object `auxiliary` texture laid over it. A swatch id that is not
/// in the catalog falls back to `last_color`, the most recent solid colour.
pub fn material_for(
    selection: &AppearanceSelection,
    last_color: Rgb,
    auxiliary: Option<&str>,
    catalog: &TextureCatalog,
) -> MaterialAssignment {
    match selection {
        AppearanceSelection::NamedTexture(id) => match catalog.get(id) {
            Some(image) => MaterialAssignment::textured(image),
            None => {
                log::warn!("Texture {id:?} is not in the catalog, falling back to {last_color}");
                MaterialAssignment::flat(last_color, auxiliary)
            }
        },
        AppearanceSelection::SolidColor(color) => MaterialAssignment::flat(*color, auxiliary),
    }
}

/// Assign the material for `selection` to every mesh node of `object`.
///
/// Returns the number of mesh nodes that were assigned.
pub fn resolve(
    object: &mut RenderableObject,
    selection: &AppearanceSelection,
    last_color: Rgb,
    auxiliary: Option<&str>,
    catalog: &TextureCatalog,
) -> usize {
    let material = material_for(selection, last_color, auxiliary, catalog);
    let mut meshes = 0;
    object.for_each_mesh_mut(|mesh| {
        mesh.assign(material.clone());
        meshes += 1;
    });
    object.bump_generation();
    log::debug!("Resolved {selection:?} onto {meshes} mesh nodes");
    meshes
}
