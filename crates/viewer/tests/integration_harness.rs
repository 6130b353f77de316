//! Integration tests for TestHarness.
//!
//! Tests click highlighting, cross-section clipping and display toggles
//! against loaded models, the way a user drives them from the panels.

use glam::Vec3;
use mesh_viewer_lib::clipping::ClipPlane;
use mesh_viewer_lib::fixtures::*;
use mesh_viewer_lib::harness::TestHarness;
use mesh_viewer_lib::highlight::{PickOutcome, DEFAULT_HIGHLIGHT_COLOR};
use mesh_viewer_lib::{ViewerConfig, ViewerEvent};
use shared::{ClipAxis, EnvironmentPreset, CLIP_OFFSET_MAX, CLIP_OFFSET_MIN};

fn two_mesh_harness() -> TestHarness {
    let mut h = TestHarness::new();
    h.load_bytes(Some("two.glb"), two_mesh_glb()).unwrap();
    h
}

fn color_of(h: &TestHarness, name: &str) -> [f32; 4] {
    let id = h.mesh_named(name).unwrap();
    h.viewer.meshes().get(id).unwrap().material.color()
}

#[test]
fn test_click_does_nothing_while_highlight_disabled() {
    let mut h = two_mesh_harness();
    let left = h.mesh_named("Left").unwrap();

    assert_eq!(h.click_mesh(left), Some(PickOutcome::Disabled));
    assert_eq!(h.viewer.selection(), None);
    assert_eq!(color_of(&h, "Left"), SHARED_BASE_COLOR);
}

#[test]
fn test_highlight_select_switch_and_disable() {
    let mut h = two_mesh_harness();
    let left = h.mesh_named("Left").unwrap();
    let right = h.mesh_named("Right").unwrap();
    h.viewer.set_highlight_enabled(true);

    // Select left
    assert_eq!(h.click_mesh(left), Some(PickOutcome::Selected(left)));
    assert_eq!(color_of(&h, "Left"), DEFAULT_HIGHLIGHT_COLOR);
    assert_eq!(color_of(&h, "Right"), SHARED_BASE_COLOR);

    // Same mesh again is a no-op
    assert_eq!(h.click_mesh(left), Some(PickOutcome::Unchanged(left)));
    assert_eq!(color_of(&h, "Left"), DEFAULT_HIGHLIGHT_COLOR);

    // Switch to right: left gets its own color back
    assert_eq!(
        h.click_mesh(right),
        Some(PickOutcome::Switched { from: left, to: right })
    );
    assert_eq!(color_of(&h, "Left"), SHARED_BASE_COLOR);
    assert_eq!(color_of(&h, "Right"), DEFAULT_HIGHLIGHT_COLOR);

    // Empty space keeps the selection
    assert_eq!(h.click(4.0, 4.0), PickOutcome::Miss);
    assert_eq!(h.viewer.selection(), Some(right));

    // Disabling restores everything
    h.viewer.set_highlight_enabled(false);
    assert_eq!(h.viewer.selection(), None);
    assert_eq!(color_of(&h, "Right"), SHARED_BASE_COLOR);
}

#[test]
fn test_custom_highlight_color() {
    let config = ViewerConfig {
        highlight_color: [0.0, 1.0, 0.0, 1.0],
        ..ViewerConfig::default()
    };
    let mut h = TestHarness::with_config(&config);
    h.load_bytes(Some("two.glb"), two_mesh_glb()).unwrap();
    h.viewer.set_highlight_enabled(true);

    let right = h.mesh_named("Right").unwrap();
    h.click_mesh(right).unwrap();
    assert_eq!(color_of(&h, "Right"), [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn test_new_model_drops_selection() {
    let mut h = two_mesh_harness();
    h.viewer.set_highlight_enabled(true);
    let left = h.mesh_named("Left").unwrap();
    h.click_mesh(left).unwrap();

    h.load_bytes(Some("cube.stl"), binary_stl(&offset_cube_triangles(Vec3::ZERO)))
        .unwrap();
    assert_eq!(h.viewer.selection(), None);
    // The highlight toggle itself survives the model change
    assert!(h.viewer.controls().highlight_enabled);
}

#[test]
fn test_clip_toggle_sets_and_clears_planes() {
    let mut h = two_mesh_harness();
    assert!(h.viewer.meshes().iter().all(|r| r.material.clip_planes().is_empty()));

    h.viewer.set_clip_enabled(true);
    let expected = ClipPlane::from_axis(ClipAxis::X, 0.0);
    assert_eq!(h.viewer.clip_plane(), Some(expected));
    assert!(h
        .viewer
        .meshes()
        .iter()
        .all(|r| r.material.clip_planes() == [expected]));

    h.viewer.set_clip_enabled(false);
    assert_eq!(h.viewer.clip_plane(), None);
    assert!(h.viewer.meshes().iter().all(|r| r.material.clip_planes().is_empty()));
}

#[test]
fn test_clip_axis_and_offset_update_every_mesh() {
    let mut h = two_mesh_harness();
    h.viewer.set_clip_enabled(true);
    h.viewer.set_clip_axis(ClipAxis::Z);
    assert_eq!(h.viewer.set_clip_offset(1.5), 1.5);

    let plane = h.viewer.clip_plane().unwrap();
    assert_eq!(plane, ClipPlane::from_axis(ClipAxis::Z, 1.5));
    for record in h.viewer.meshes().iter() {
        assert_eq!(record.material.clip_planes(), [plane]);
    }
    assert!(plane.clips(Vec3::new(0.0, 0.0, 2.0)));
    assert!(!plane.clips(Vec3::new(0.0, 0.0, 1.0)));
}

#[test]
fn test_clip_offset_clamped_and_nan_ignored() {
    let mut h = two_mesh_harness();
    assert_eq!(h.viewer.set_clip_offset(42.0), CLIP_OFFSET_MAX);
    assert_eq!(h.viewer.set_clip_offset(-42.0), CLIP_OFFSET_MIN);
    assert_eq!(h.viewer.set_clip_offset(f32::NAN), CLIP_OFFSET_MIN);
    assert_eq!(h.viewer.controls().clip_offset, CLIP_OFFSET_MIN);
}

#[test]
fn test_clip_state_applies_to_next_model() {
    let mut h = TestHarness::new();
    h.viewer.set_clip_enabled(true);
    h.viewer.set_clip_axis(ClipAxis::Y);

    h.load_bytes(Some("two.glb"), two_mesh_glb()).unwrap();
    let expected = ClipPlane::from_axis(ClipAxis::Y, 0.0);
    assert!(h
        .viewer
        .meshes()
        .iter()
        .all(|r| r.material.clip_planes() == [expected]));
}

#[test]
fn test_picking_ignores_clipping() {
    let mut h = two_mesh_harness();
    h.viewer.set_highlight_enabled(true);
    h.viewer.set_clip_enabled(true);
    h.viewer.set_clip_offset(CLIP_OFFSET_MIN);

    // Everything is cut away visually, but the click still lands
    let right = h.mesh_named("Right").unwrap();
    assert_eq!(h.click_mesh(right), Some(PickOutcome::Selected(right)));
}

#[test]
fn test_wireframe_and_environment() {
    let mut h = two_mesh_harness();
    h.viewer.set_wireframe(true);
    assert!(h.viewer.meshes().iter().all(|r| r.material.wireframe()));

    h.viewer.set_environment(EnvironmentPreset::Night);
    assert_eq!(h.viewer.environment(), EnvironmentPreset::Night);

    // Flags carry over to the next model
    h.load_bytes(Some("cube.gltf"), embedded_gltf().into_bytes()).unwrap();
    assert!(h.viewer.meshes().iter().all(|r| r.material.wireframe()));

    h.viewer.set_wireframe(false);
    assert!(h.viewer.meshes().iter().all(|r| !r.material.wireframe()));
}

#[test]
fn test_events_follow_the_session() {
    let mut h = two_mesh_harness();
    let _ = h.load_bytes(Some("bad.glb"), bad_index_glb());
    h.clear();

    let events = h.viewer.take_events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], ViewerEvent::Loaded { name: "two.glb".into() });
    assert!(matches!(events[1], ViewerEvent::LoadFailed { .. }));
    assert_eq!(events[2], ViewerEvent::Cleared);
    assert!(h.viewer.take_events().is_empty());
}

#[test]
fn test_reset_camera_restores_default_pose() {
    let mut h = two_mesh_harness();
    let initial = h.viewer.camera_pose();
    h.viewer.camera_mut().rotate(40.0, 10.0);
    h.viewer.camera_mut().zoom(0.3);
    assert_ne!(h.viewer.camera_pose(), initial);

    h.viewer.reset_camera();
    assert_eq!(h.viewer.camera_pose(), initial);
}
