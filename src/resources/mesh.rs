use anyhow::bail;

use crate::{
    data_structures::model::{Geometry, MeshNode, SourceMaterial},
    resources::MaterialLibrary,
};

/// Turn one parsed OBJ model into a mesh node bound to its MTL material.
///
/// Returns `Ok(None)` for models without triangles: they are not drawable and
/// are left out of the object tree.
pub fn to_mesh_node(model: &tobj::Model, materials: &MaterialLibrary) -> anyhow::Result<Option<MeshNode>> {
    let mesh = &model.mesh;
    if mesh.indices.len() < 3 {
        return Ok(None);
    }
    if mesh.positions.len() % 3 != 0 {
        bail!("{}: position data is not a multiple of 3", model.name);
    }
    if mesh.indices.len() % 3 != 0 {
        bail!("{}: index data is not made of triangles", model.name);
    }

    let vertex_count = mesh.positions.len() / 3;
    if let Some(index) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        bail!(
            "{}: index {} is out of range for {} vertices",
            model.name,
            index,
            vertex_count
        );
    }

    let positions = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let normals = mesh
        .normals
        .chunks_exact(3)
        .map(|n| [n[0], n[1], n[2]])
        .collect();
    // OBJ's v axis points up, wgpu's points down.
    let tex_coords = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| [t[0], 1.0 - t[1]])
        .collect();

    let geometry = Geometry {
        positions,
        normals,
        tex_coords,
        indices: mesh.indices.clone(),
    };

    let source_material = mesh
        .material_id
        .and_then(|id| materials.materials.get(id))
        .map(SourceMaterial::from);
    if source_material.is_none() {
        log::debug!("{} is not bound to any material of {}", model.name, materials.source);
    }

    Ok(Some(MeshNode::new(&model.name, geometry, source_material)))
}
