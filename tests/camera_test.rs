use cgmath::{Point3, Rad};
use product_viewer::{
    camera::{CameraControl, CameraState, OrbitController},
    config::CameraConfig,
};

use crate::common::test_utils::frame_time;
mod common;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn default_eye_looks_down_negative_z() {
    let camera = CameraState::from_config(&CameraConfig::default());
    let eye = camera.eye();
    assert!(close(eye.x, 0.0) && close(eye.y, 0.0) && close(eye.z, 5.0));
}

#[test]
fn eye_orbits_the_target() {
    let mut camera = CameraState::new(Point3::new(1.0, 2.0, 3.0), 2.0);
    camera.yaw = Rad(std::f32::consts::FRAC_PI_2);
    let eye = camera.eye();
    assert!(close(eye.x, 3.0) && close(eye.y, 2.0) && close(eye.z, 3.0));
}

#[test]
fn pitch_never_flips_over_the_pole() {
    let mut camera = CameraState::new(Point3::new(0.0, 0.0, 0.0), 5.0);
    let mut controller = OrbitController::new(0.01, 0.1);

    controller.handle_mouse(0.0, 10_000.0);
    controller.update(&mut camera, frame_time());
    assert!(camera.pitch.0 < std::f32::consts::FRAC_PI_2);

    controller.handle_mouse(0.0, -20_000.0);
    controller.update(&mut camera, frame_time());
    assert!(camera.pitch.0 > -std::f32::consts::FRAC_PI_2);
}

#[test]
fn zoom_stays_within_bounds() {
    let config = CameraConfig::default();
    let mut camera = CameraState::from_config(&config);
    let mut controller = OrbitController::from_config(&config);

    controller.handle_scroll(9.9);
    controller.update(&mut camera, frame_time());
    assert!(close(camera.distance, config.min_distance));

    for _ in 0..100 {
        controller.handle_scroll(-5.0);
        controller.update(&mut camera, frame_time());
    }
    assert!(close(camera.distance, config.max_distance));
}

#[test]
fn input_is_consumed_by_one_update() {
    let mut camera = CameraState::new(Point3::new(0.0, 0.0, 0.0), 5.0);
    let mut controller = OrbitController::new(0.01, 0.1);

    controller.handle_mouse(50.0, 0.0);
    controller.update(&mut camera, frame_time());
    let yaw = camera.yaw;
    controller.update(&mut camera, frame_time());

    assert_eq!(camera.yaw, yaw);
    assert!(close(yaw.0, -0.5));
}
