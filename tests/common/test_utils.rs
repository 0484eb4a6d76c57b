#![allow(dead_code)]

use instant::Duration;
use product_viewer::{
    MaterialAssignment, RenderableObject,
    camera::{CameraControl, CameraState},
    data_structures::model::{Geometry, MeshNode, ObjectNode, SourceMaterial},
    error::DrawFailure,
    flow::DrawTarget,
    resources::MemoryStore,
};

pub const BOX_OBJ: &str = include_str!("../fixtures/box.obj");
pub const BOX_MTL: &str = include_str!("../fixtures/box.mtl");
pub const BROKEN_OBJ: &str = include_str!("../fixtures/broken.obj");
pub const SWATCH_PNG: &[u8] = include_bytes!("../fixtures/swatch.png");

/// A store holding the box fixture and one decodable swatch.
pub fn box_store() -> MemoryStore {
    MemoryStore::new()
        .with("box.obj", BOX_OBJ)
        .with("box.mtl", BOX_MTL)
        .with("broken.obj", BROKEN_OBJ)
        .with("swatch.png", SWATCH_PNG)
        .with("garbage.png", "definitely not a png")
}

fn quad() -> Geometry {
    Geometry {
        positions: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        tex_coords: vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Three mesh nodes, one of them nested in a sub-group.
pub fn three_mesh_object() -> RenderableObject {
    let kraft = SourceMaterial {
        name: "kraft".to_string(),
        diffuse: None,
        diffuse_texture: Some("kraft.png".to_string()),
    };
    RenderableObject::new(ObjectNode::Group {
        name: "box".to_string(),
        children: vec![
            ObjectNode::Mesh(MeshNode::new("body", quad(), Some(kraft.clone()))),
            ObjectNode::Group {
                name: "top".to_string(),
                children: vec![ObjectNode::Mesh(MeshNode::new("lid", quad(), Some(kraft)))],
            },
            ObjectNode::Mesh(MeshNode::new("flap", quad(), None)),
        ],
    })
}

pub fn materials_of(object: &RenderableObject) -> Vec<MaterialAssignment> {
    object.meshes().into_iter().map(|m| m.material().clone()).collect()
}

/// What one submitted frame looked like.
#[derive(Clone, Debug)]
pub struct Frame {
    pub clear_colour: wgpu::Color,
    pub materials: Option<Vec<MaterialAssignment>>,
    pub eye: [f32; 3],
}

/// Draw target that records frames instead of talking to a GPU.
#[derive(Debug)]
pub struct RecordingTarget {
    pub clear_colour: wgpu::Color,
    pub frames: Vec<Frame>,
    /// Fail the submission with this (zero-based) index.
    pub fail_on: Option<usize>,
    pub attempts: usize,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self {
            clear_colour: wgpu::Color::BLACK,
            frames: Vec::new(),
            fail_on: None,
            attempts: 0,
        }
    }

    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on: Some(attempt),
            ..Self::new()
        }
    }

    pub fn last(&self) -> &Frame {
        self.frames.last().expect("no frame was drawn")
    }
}

impl Default for RecordingTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawTarget for RecordingTarget {
    fn set_clear_colour(&mut self, colour: wgpu::Color) {
        self.clear_colour = colour;
    }

    fn draw(&mut self, object: Option<&RenderableObject>, camera: &CameraState) -> Result<(), DrawFailure> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on == Some(attempt) {
            return Err(DrawFailure::Submission("device lost".to_string()));
        }
        let eye = camera.eye();
        self.frames.push(Frame {
            clear_colour: self.clear_colour,
            materials: object.map(materials_of),
            eye: [eye.x, eye.y, eye.z],
        });
        Ok(())
    }
}

/// Camera control that only counts how often it was asked to update.
#[derive(Debug, Default)]
pub struct CountingControl {
    pub updates: usize,
}

impl CameraControl for CountingControl {
    fn update(&mut self, _camera: &mut CameraState, _dt: Duration) {
        self.updates += 1;
    }
}

pub fn frame_time() -> Duration {
    Duration::from_millis(16)
}
