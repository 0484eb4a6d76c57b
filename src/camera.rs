//! Orbit camera: state, pointer controller, projection and GPU uniform.
//!
//! [`CameraState`] is read by the render loop once per frame. It is only ever
//! mutated through a [`CameraControl`], normally the [`OrbitController`] that
//! turns pointer drags into yaw/pitch and wheel input into zoom.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_PITCH: f32 = FRAC_PI_2 - 0.01;

/// Camera orbiting a target point.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    pub target: Point3<f32>,
    pub distance: f32,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl CameraState {
    pub fn new(target: Point3<f32>, distance: f32) -> Self {
        Self {
            target,
            distance,
            yaw: Rad(0.0),
            pitch: Rad(0.0),
            min_distance: 0.0,
            max_distance: f32::MAX,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            ..Self::new(Point3::new(0.0, 0.0, 0.0), config.distance)
        }
    }

    /// With zero yaw and pitch the eye sits on +z, looking at the target.
    pub fn eye(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let offset = Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
        self.target + offset.normalize() * self.distance
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }

    fn clamp(&mut self) {
        self.pitch = Rad(self.pitch.0.clamp(-SAFE_PITCH, SAFE_PITCH));
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Anything that advances the camera once per frame.
pub trait CameraControl {
    fn update(&mut self, camera: &mut CameraState, dt: Duration);
}

/// Left-drag to orbit, scroll to zoom.
#[derive(Debug)]
pub struct OrbitController {
    rotate_speed: f32,
    zoom_speed: f32,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    scroll: f32,
}

impl OrbitController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            dragging: false,
            cursor: None,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.rotate_speed, config.zoom_speed)
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical += dy as f32;
    }

    /// Positive lines zoom in.
    pub fn handle_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    /// Returns true if the event was used to move the camera.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state.is_pressed();
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let moved = match (self.dragging, self.cursor) {
                    (true, Some(last)) => {
                        self.handle_mouse(position.x - last.x, position.y - last.y);
                        true
                    }
                    _ => false,
                };
                self.cursor = Some(*position);
                moved
            }
            WindowEvent::CursorLeft { .. } => {
                self.dragging = false;
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_scroll(match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 100.0,
                });
                true
            }
            _ => false,
        }
    }
}

impl CameraControl for OrbitController {
    // Input is applied as it arrived, so dt is not needed to scale it.
    fn update(&mut self, camera: &mut CameraState, _dt: Duration) {
        camera.yaw -= Rad(self.rotate_horizontal * self.rotate_speed);
        camera.pitch += Rad(self.rotate_vertical * self.rotate_speed);
        camera.distance *= 1.0 - self.scroll * self.zoom_speed;
        camera.clamp();

        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.scroll = 0.0;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &CameraState, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: the uniform, its buffer and bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
