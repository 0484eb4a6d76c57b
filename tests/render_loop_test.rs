use cgmath::Point3;
use product_viewer::{
    MaterialAssignment, Rgb, TextureCatalog,
    camera::{CameraState, OrbitController},
    error::DrawFailure,
    flow::{DrawTarget, RenderLoop},
    resources::AssetLoader,
    scene::SceneState,
};

use crate::common::test_utils::{
    CountingControl, RecordingTarget, box_store, frame_time, three_mesh_object,
};
mod common;

const INITIAL: Rgb = Rgb::new(0x95, 0xc2, 0x8c);
const BACKGROUND: Rgb = Rgb::new(0xf4, 0xf3, 0xf2);

fn scene() -> SceneState {
    SceneState::new(INITIAL, CameraState::new(Point3::new(0.0, 0.0, 0.0), 5.0))
}

#[test]
fn initial_colour_is_applied_once_the_object_arrives() {
    let catalog = TextureCatalog::product_swatches();
    let mut state = scene();
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controls = CountingControl::default();
    let mut target = RecordingTarget::new();

    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();
    assert!(target.last().materials.is_none());

    state.attach(three_mesh_object());
    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();

    let materials = target.last().materials.clone().unwrap();
    assert_eq!(materials.len(), 3);
    assert!(materials.iter().all(|m| *m == MaterialAssignment::flat(INITIAL, None)));
}

#[test]
fn texture_selection_shows_on_the_next_frame() {
    let catalog = TextureCatalog::product_swatches();
    let mut state = scene();
    state.attach(three_mesh_object());
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controls = CountingControl::default();
    let mut target = RecordingTarget::new();

    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();
    state.set_appearance_texture("carton");
    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();

    let materials = target.last().materials.clone().unwrap();
    assert!(materials.iter().all(|m| *m == MaterialAssignment::textured("carton.png")));
}

#[tokio::test]
async fn failed_load_keeps_drawing_the_background() {
    let catalog = TextureCatalog::product_swatches();
    let mut state = scene();
    let mut loader = AssetLoader::new(box_store());
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controls = CountingControl::default();
    let mut target = RecordingTarget::new();

    let result = loader.load("box.obj", "nope.mtl").await;
    if let Ok(object) = result {
        state.attach(object);
    }

    for _ in 0..5 {
        render_loop
            .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
            .unwrap();
    }

    assert!(!state.is_ready());
    assert_eq!(render_loop.frames(), 5);
    assert!(target.frames.iter().all(|f| f.materials.is_none()));
    assert!(target.frames.iter().all(|f| f.clear_colour == BACKGROUND.to_wgpu()));
    assert_eq!(controls.updates, 5);
}

#[test]
fn rapid_changes_collapse_into_the_latest() {
    let catalog = TextureCatalog::product_swatches();
    let mut state = scene();
    state.attach(three_mesh_object());
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controls = CountingControl::default();
    let mut target = RecordingTarget::new();

    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();
    let generation = state.object().unwrap().generation();

    state.set_appearance_texture("carton");
    state.set_appearance_color(Rgb::new(0x10, 0x20, 0x30));
    state.set_appearance_texture("blanc");
    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();

    assert_eq!(state.object().unwrap().generation(), generation + 1);
    let materials = target.last().materials.clone().unwrap();
    assert!(materials.iter().all(|m| *m == MaterialAssignment::textured("blanc.png")));
    assert_eq!(state.last_color(), Rgb::new(0x10, 0x20, 0x30));
}

#[test]
fn unchanged_appearance_is_not_resolved_again() {
    let catalog = TextureCatalog::product_swatches();
    let mut state = scene();
    state.attach(three_mesh_object());
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controls = CountingControl::default();
    let mut target = RecordingTarget::new();

    for _ in 0..3 {
        render_loop
            .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
            .unwrap();
    }

    assert_eq!(state.object().unwrap().generation(), 1);
    assert!(!state.has_appearance_change());
}

#[test]
fn clear_colour_is_reasserted_every_frame() {
    let catalog = TextureCatalog::new();
    let mut state = scene();
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controls = CountingControl::default();
    let mut target = RecordingTarget::new();

    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();
    target.set_clear_colour(wgpu::Color::RED);
    render_loop
        .cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target)
        .unwrap();

    assert_eq!(target.last().clear_colour, BACKGROUND.to_wgpu());
}

#[test]
fn draw_failure_stops_the_loop() {
    let catalog = TextureCatalog::new();
    let mut state = scene();
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controls = CountingControl::default();
    let mut target = RecordingTarget::failing_on(2);

    let mut results = Vec::new();
    for _ in 0..4 {
        results.push(render_loop.cycle(&mut state, &catalog, &mut controls, frame_time(), &mut target));
    }

    assert!(results[0].is_ok() && results[1].is_ok());
    assert!(matches!(results[2], Err(DrawFailure::Submission(_))));
    assert!(matches!(results[3], Err(DrawFailure::Terminated)));
    assert!(!render_loop.is_running());
    assert_eq!(render_loop.frames(), 2);
    // nothing is submitted once the loop stopped
    assert_eq!(target.attempts, 3);
}

#[test]
fn orbit_input_moves_the_drawn_camera() {
    let catalog = TextureCatalog::new();
    let mut state = scene();
    let mut render_loop = RenderLoop::new(BACKGROUND.to_wgpu());
    let mut controller = OrbitController::new(0.01, 0.1);
    let mut target = RecordingTarget::new();

    render_loop
        .cycle(&mut state, &catalog, &mut controller, frame_time(), &mut target)
        .unwrap();
    let [x, y, z] = target.last().eye;
    assert!(x.abs() < 1e-5 && y.abs() < 1e-5 && (z - 5.0).abs() < 1e-5);

    controller.handle_mouse(-100.0, 0.0);
    render_loop
        .cycle(&mut state, &catalog, &mut controller, frame_time(), &mut target)
        .unwrap();

    let [x, _, _] = target.last().eye;
    assert!(x > 0.0);
}
