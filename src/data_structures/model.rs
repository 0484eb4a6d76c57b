//! CPU-side model of the loaded product.
//!
//! A [`RenderableObject`] is the tree produced by the asset loader. Its drawable
//! leaves are [`MeshNode`]s, each carrying a mutable material slot that the
//! appearance resolver rewrites whenever the user's selection changes. GPU
//! mirrors (see [`crate::render`]) compare [`RenderableObject::generation`] to
//! know when to re-upload materials.

use std::{fmt, str::FromStr};

use crate::error::ColorParseError;

/// An 8-bit sRGB colour, written as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ColorParseError::InvalidLength(digits.len()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(value.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit(value.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Build a colour from unit floats such as an MTL `Kd` entry.
    pub fn from_unit(rgb: [f32; 3]) -> Self {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2]))
    }

    /// Linear-light channels, which is what an sRGB surface expects from shaders
    /// and clear colours.
    pub fn to_linear(self) -> [f32; 3] {
        let decode = |c: u8| {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [decode(self.r), decode(self.g), decode(self.b)]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b] = self.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// The colour/texture descriptor bound to one mesh node.
///
/// `None` for both fields draws plain white. A texture with no base colour is
/// drawn untinted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialAssignment {
    pub base_color: Option<Rgb>,
    pub texture: Option<String>,
}

impl MaterialAssignment {
    pub fn flat(color: Rgb, overlay: Option<&str>) -> Self {
        Self {
            base_color: Some(color),
            texture: overlay.map(str::to_string),
        }
    }

    pub fn textured(image: &str) -> Self {
        Self {
            base_color: None,
            texture: Some(image.to_string()),
        }
    }

    /// What the material library says the node should look like before any
    /// user selection is applied.
    pub fn from_source(source: Option<&SourceMaterial>) -> Self {
        match source {
            Some(source) => Self {
                base_color: source.diffuse,
                texture: source.diffuse_texture.clone(),
            },
            None => Self::default(),
        }
    }
}

/// The MTL material a mesh node was bound to when it was parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceMaterial {
    pub name: String,
    pub diffuse: Option<Rgb>,
    pub diffuse_texture: Option<String>,
}

impl From<&tobj::Material> for SourceMaterial {
    fn from(m: &tobj::Material) -> Self {
        Self {
            name: m.name.clone(),
            diffuse: m.diffuse.map(Rgb::from_unit),
            diffuse_texture: m.diffuse_texture.clone(),
        }
    }
}

/// Triangle geometry of one mesh node. The appearance code never looks inside.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertices(&self) -> Vec<ModelVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, position)| ModelVertex {
                position: *position,
                tex_coords: self.tex_coords.get(i).copied().unwrap_or_default(),
                normal: self.normals.get(i).copied().unwrap_or_default(),
            })
            .collect()
    }
}

/// A drawable leaf of the object tree.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub name: String,
    pub geometry: Geometry,
    pub source_material: Option<SourceMaterial>,
    material: MaterialAssignment,
}

impl MeshNode {
    pub fn new(name: &str, geometry: Geometry, source_material: Option<SourceMaterial>) -> Self {
        let material = MaterialAssignment::from_source(source_material.as_ref());
        Self {
            name: name.to_string(),
            geometry,
            source_material,
            material,
        }
    }

    pub fn material(&self) -> &MaterialAssignment {
        &self.material
    }

    pub(crate) fn assign(&mut self, material: MaterialAssignment) {
        self.material = material;
    }
}

#[derive(Clone, Debug)]
pub enum ObjectNode {
    Group {
        name: String,
        children: Vec<ObjectNode>,
    },
    Mesh(MeshNode),
}

impl ObjectNode {
    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a MeshNode)) {
        match self {
            ObjectNode::Group { children, .. } => {
                for child in children {
                    child.walk(f);
                }
            }
            ObjectNode::Mesh(mesh) => f(mesh),
        }
    }

    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut MeshNode)) {
        match self {
            ObjectNode::Group { children, .. } => {
                for child in children {
                    child.walk_mut(f);
                }
            }
            ObjectNode::Mesh(mesh) => f(mesh),
        }
    }
}

/// The loaded product: created once by the loader, then owned by the scene for
/// the rest of the session.
#[derive(Clone, Debug)]
pub struct RenderableObject {
    root: ObjectNode,
    generation: u64,
}

impl RenderableObject {
    pub fn new(root: ObjectNode) -> Self {
        Self {
            root,
            generation: 0,
        }
    }

    pub fn root(&self) -> &ObjectNode {
        &self.root
    }

    /// Mesh nodes in depth-first order. The order is stable for the lifetime of
    /// the object.
    pub fn meshes(&self) -> Vec<&MeshNode> {
        let mut meshes = Vec::new();
        self.root.walk(&mut |mesh| meshes.push(mesh));
        meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes().len()
    }

    pub fn for_each_mesh_mut(&mut self, mut f: impl FnMut(&mut MeshNode)) {
        self.root.walk_mut(&mut f);
    }

    /// Bumped once per appearance resolution.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
