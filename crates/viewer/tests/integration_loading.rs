//! Integration tests for the load pipeline.
//!
//! Tests end-to-end: bytes + optional name -> detect -> parse -> normalize ->
//! installed mesh set, through the public viewer API.

use std::time::Duration;

use glam::Vec3;
use mesh_viewer_lib::error::LoadError;
use mesh_viewer_lib::fixtures::*;
use mesh_viewer_lib::harness::TestHarness;
use mesh_viewer_lib::normalize::NEUTRAL_COLOR;
use mesh_viewer_lib::LoadStatus;
use shared::ModelFormat;

fn stl_cube_at(center: Vec3) -> Vec<u8> {
    binary_stl(&offset_cube_triangles(center))
}

#[test]
fn test_glb_end_to_end() {
    let mut h = TestHarness::new();
    h.load_bytes(Some("two.glb"), two_mesh_glb()).unwrap();

    assert_eq!(h.viewer.status(), &LoadStatus::Ready);
    assert_eq!(h.mesh_count(), 2);
    let errors = h.validate_meshes();
    assert!(errors.is_empty(), "Validation errors: {:?}", errors);

    let info = h.viewer.model_info().unwrap();
    assert_eq!(info.format, ModelFormat::Glb);
    assert!(!info.detection.is_probed());
    assert_eq!(info.display_name(), "two.glb");
    assert_eq!(info.size_bytes, two_mesh_glb().len());
}

#[test]
fn test_shared_material_is_not_aliased() {
    let mut h = TestHarness::new();
    h.load_bytes(Some("two.glb"), two_mesh_glb()).unwrap();
    let colors: Vec<_> = h.viewer.meshes().iter().map(|r| r.material.color()).collect();
    assert_eq!(colors, vec![SHARED_BASE_COLOR, SHARED_BASE_COLOR]);

    let left = h.mesh_named("Left").unwrap();
    h.viewer.set_highlight_enabled(true);
    h.click_mesh(left).unwrap();

    let right = h.mesh_named("Right").unwrap();
    assert_eq!(
        h.viewer.meshes().get(right).unwrap().material.color(),
        SHARED_BASE_COLOR
    );
}

#[test]
fn test_embedded_gltf_by_name() {
    let mut h = TestHarness::new();
    h.load_bytes(Some("cube.gltf"), embedded_gltf().into_bytes()).unwrap();
    assert_eq!(h.mesh_count(), 1);
    assert_eq!(h.viewer.model_info().unwrap().format, ModelFormat::Gltf);
}

#[test]
fn test_stl_hinted_and_recentered() {
    let mut h = TestHarness::new();
    h.load_bytes(Some("model.stl"), stl_cube_at(Vec3::new(3.0, -2.0, 7.0))).unwrap();

    assert_eq!(h.mesh_count(), 1);
    let record = h.viewer.meshes().iter().next().unwrap();
    assert!(record.bounds.center().length() < 1e-4);
    assert_eq!(record.material.color(), NEUTRAL_COLOR);
    assert!(!h.viewer.model_info().unwrap().detection.is_probed());
}

#[test]
fn test_stl_without_extension_is_probed() {
    let mut h = TestHarness::new();
    h.load_bytes(None, stl_cube_at(Vec3::ZERO)).unwrap();

    let info = h.viewer.model_info().unwrap();
    assert_eq!(info.format, ModelFormat::Stl);
    assert!(info.detection.is_probed());
    assert_eq!(info.display_name(), "Untitled");
}

#[test]
fn test_ascii_stl_without_extension() {
    let mut h = TestHarness::new();
    h.load_bytes(None, ascii_stl().into_bytes()).unwrap();
    assert_eq!(h.mesh_count(), 1);
    assert_eq!(h.viewer.meshes().triangle_count(), 1);
}

#[test]
fn test_glb_without_extension_is_probed() {
    let mut h = TestHarness::new();
    h.load_bytes(None, two_mesh_glb()).unwrap();
    let info = h.viewer.model_info().unwrap();
    assert_eq!(info.format, ModelFormat::Glb);
    assert!(info.detection.is_probed());
}

#[test]
fn test_unsupported_extension_touches_nothing() {
    let mut h = TestHarness::new();
    let err = h.load_bytes(Some("model.obj"), two_mesh_glb()).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    assert!(!h.viewer.has_model());
    assert_eq!(h.viewer.resources().live_count(), 0);
}

#[test]
fn test_hinted_parse_failure_is_malformed() {
    let mut h = TestHarness::new();
    let err = h.load_bytes(Some("model.glb"), stl_cube_at(Vec3::ZERO)).unwrap_err();
    assert!(matches!(err, LoadError::MalformedDocument(_)));
    assert!(matches!(h.viewer.status(), LoadStatus::Failed(_)));
}

#[test]
fn test_failed_load_keeps_previous_model() {
    let mut h = TestHarness::new();
    h.load_bytes(Some("two.glb"), two_mesh_glb()).unwrap();
    assert!(h.load_bytes(Some("broken.glb"), bad_index_glb()).is_err());

    assert_eq!(h.mesh_count(), 2);
    assert_eq!(h.viewer.model_info().unwrap().format, ModelFormat::Glb);
}

#[test]
fn test_external_buffer_rejected() {
    let mut h = TestHarness::new();
    let err = h
        .load_bytes(Some("scene.gltf"), external_buffer_gltf().into_bytes())
        .unwrap_err();
    assert!(matches!(err, LoadError::MalformedDocument(_)));
    assert!(!h.viewer.has_model());
}

#[test]
fn test_nested_and_instanced_transforms_baked() {
    let mut h = TestHarness::new();
    h.load_bytes(Some("nested.glb"), nested_glb()).unwrap();
    let record = h.viewer.meshes().iter().next().unwrap();
    assert!((record.bounds.center() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-4);

    h.load_bytes(Some("instanced.glb"), instanced_glb()).unwrap();
    assert_eq!(h.mesh_count(), 4);
    let left = h.viewer.meshes().iter().filter(|r| r.bounds.center().x < 0.0).count();
    assert_eq!(left, 2);
}

#[test]
fn test_stale_load_never_installs() {
    let mut h = TestHarness::new();
    let a = h.begin_load(Some("a.glb"), two_mesh_glb()).unwrap();
    let b = h.begin_load(Some("b.stl"), stl_cube_at(Vec3::ZERO)).unwrap();

    // B finishes first, then A arrives late
    h.finish_load(&b).unwrap();
    let err = h.finish_load(&a).unwrap_err();
    assert!(matches!(err, LoadError::StaleLoad { .. }));

    assert_eq!(h.viewer.model_info().unwrap().format, ModelFormat::Stl);
    assert_eq!(h.mesh_count(), 1);
    assert_eq!(h.viewer.resources().live_count(), 1);
}

#[test]
fn test_sources_released_on_replace_and_clear() {
    let mut h = TestHarness::new();
    h.load_bytes(Some("a.glb"), two_mesh_glb()).unwrap();
    h.load_bytes(Some("b.stl"), stl_cube_at(Vec3::ZERO)).unwrap();
    assert_eq!(h.viewer.resources().live_count(), 1);
    assert_eq!(h.viewer.resources().released_count(), 1);

    h.clear();
    assert_eq!(h.viewer.resources().live_count(), 0);
    assert_eq!(h.viewer.resources().released_count(), 2);

    // Clearing twice releases nothing more
    h.clear();
    assert_eq!(h.viewer.resources().released_count(), 2);
}

#[test]
fn test_background_load_lands() {
    let mut h = TestHarness::new();
    h.load_in_background(Some("two.glb"), two_mesh_glb()).unwrap();
    assert!(h.viewer.status().is_loading());

    let applied = h.wait_for_loads(Duration::from_secs(10));
    assert_eq!(applied, 1);
    assert_eq!(h.viewer.status(), &LoadStatus::Ready);
    assert_eq!(h.mesh_count(), 2);
}

#[test]
fn test_background_superseded_load_is_dropped() {
    let mut h = TestHarness::new();
    h.load_in_background(Some("a.glb"), two_mesh_glb()).unwrap();
    h.load_in_background(Some("b.stl"), stl_cube_at(Vec3::ZERO)).unwrap();

    h.wait_for_loads(Duration::from_secs(10));
    assert_eq!(h.viewer.model_info().unwrap().format, ModelFormat::Stl);
    assert_eq!(h.viewer.resources().live_count(), 1);
}
