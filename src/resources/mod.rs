//! Asset loading: material library first, then geometry bound to it.
//!
//! - `store` abstracts where bytes come from (disk, http, memory)
//! - `mesh` converts parsed OBJ models into mesh nodes
//! - `texture` fetches and decodes swatch images

use std::{
    collections::HashMap,
    io::{BufReader, Cursor},
};

use anyhow::Context;

use crate::{
    data_structures::model::{ObjectNode, RenderableObject},
    error::{LoadError, MaterialMissing},
};

pub mod mesh;
pub mod store;
pub mod texture;

pub use store::AssetStore;
#[cfg(target_arch = "wasm32")]
pub use store::HttpStore;
pub use store::MemoryStore;
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;

/// A parsed MTL file.
#[derive(Clone, Debug)]
pub struct MaterialLibrary {
    pub source: String,
    pub materials: Vec<tobj::Material>,
    pub index: HashMap<String, usize>,
}

/// Loads the product model from an [`AssetStore`].
///
/// The material library has to be resolved before geometry parsing starts,
/// because mesh nodes are bound to their materials as they are built.
/// [`load`](Self::load) does both steps in that order; the steps are also
/// exposed on their own.
#[derive(Debug)]
pub struct AssetLoader<S> {
    store: S,
    materials: Option<MaterialLibrary>,
}

impl<S: AssetStore> AssetLoader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            materials: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn materials(&self) -> Option<&MaterialLibrary> {
        self.materials.as_ref()
    }

    pub async fn load(&mut self, geometry: &str, material: &str) -> Result<RenderableObject, LoadError> {
        self.fetch_materials(material).await?;
        self.fetch_geometry(geometry).await
    }

    /// Fetch and parse the MTL library.
    pub async fn fetch_materials(&mut self, source: &str) -> Result<&MaterialLibrary, LoadError> {
        log::info!("Fetching material library {source}");
        let text = self
            .store
            .load_string(source)
            .await
            .map_err(LoadError::material)?;
        let (materials, index) = tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(text)))
            .with_context(|| format!("could not parse material library {source}"))
            .map_err(LoadError::material)?;
        log::debug!("{source} defines {} materials", materials.len());
        Ok(&*self.materials.insert(MaterialLibrary {
            source: source.to_string(),
            materials,
            index,
        }))
    }

    /// Fetch and parse the OBJ geometry, binding it to the fetched material library.
    ///
    /// Fails with [`MaterialMissing`] before touching the store if
    /// [`fetch_materials`](Self::fetch_materials) has not succeeded yet.
    pub async fn fetch_geometry(&self, source: &str) -> Result<RenderableObject, LoadError> {
        let library = self
            .materials
            .as_ref()
            .ok_or_else(|| LoadError::geometry(MaterialMissing.into()))?;

        log::info!("Fetching geometry {source}");
        let text = self
            .store
            .load_string(source)
            .await
            .map_err(LoadError::geometry)?;
        let mut reader = BufReader::new(Cursor::new(text));

        // Every `mtllib` reference is answered with the library we already have.
        let (models, _) = tobj::load_obj_buf_async(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |mtllib| {
                log::debug!("Binding mtllib {mtllib} to {}", library.source);
                let materials = library.materials.clone();
                let index = library.index.clone();
                async move { tobj::MTLLoadResult::Ok((materials, index)) }
            },
        )
        .await
        .with_context(|| format!("could not parse geometry {source}"))
        .map_err(LoadError::geometry)?;

        let mut children = Vec::new();
        for (idx, model) in models.iter().enumerate() {
            match mesh::to_mesh_node(model, library) {
                Ok(Some(node)) => children.push(ObjectNode::Mesh(node)),
                Ok(None) => log::warn!(
                    "Model {} ({:?}) in {} has no triangles and is skipped",
                    idx,
                    model.name,
                    source
                ),
                Err(e) => {
                    return Err(LoadError::geometry(
                        e.context(format!("invalid model in {source}")),
                    ));
                }
            }
        }
        log::info!("{source} yielded {} mesh nodes", children.len());

        Ok(RenderableObject::new(ObjectNode::Group {
            name: source.to_string(),
            children,
        }))
    }
}
