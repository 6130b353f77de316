//! Integration tests for the ViewerCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use base64::Engine as _;
use mesh_viewer_lib::command::{execute_json, execute_json_batch};
use mesh_viewer_lib::fixtures;
use mesh_viewer_lib::harness::TestHarness;

fn glb_b64() -> String {
    base64::engine::general_purpose::STANDARD.encode(fixtures::two_mesh_glb())
}

#[test]
fn test_command_load_glb() {
    let mut h = TestHarness::new();
    let json = serde_json::json!({ "command": "load_bytes", "name": "two.glb", "base64": glb_b64() });

    let resp = execute_json(&mut h, &json.to_string()).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["format"], "glb");
    assert_eq!(data["mesh_count"], 2);
    assert_eq!(data["probed"], false);
}

#[test]
fn test_command_load_ascii_stl_text() {
    let mut h = TestHarness::new();
    let json = serde_json::json!({ "command": "load_bytes", "text": fixtures::ascii_stl() });

    let resp = execute_json(&mut h, &json.to_string()).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["format"], "stl");
    assert_eq!(data["probed"], true);
    assert_eq!(data["name"], "Untitled");
}

#[test]
fn test_command_load_unsupported_reports_error() {
    let mut h = TestHarness::new();
    let json = serde_json::json!({ "command": "load_bytes", "name": "part.step", "text": "ISO-10303-21;" });

    let resp = execute_json(&mut h, &json.to_string()).unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("unsupported format"));
    assert_eq!(h.mesh_count(), 0);
}

#[test]
fn test_command_inspect_empty() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["status"]["state"], "empty");
    assert!(data["model"].is_null());
    assert_eq!(data["mesh_count"], 0);
    assert_eq!(data["live_sources"], 0);
}

#[test]
fn test_command_full_workflow_via_json_batch() {
    let mut h = TestHarness::new();
    let load = serde_json::json!({ "command": "load_bytes", "name": "two.glb", "base64": glb_b64() });

    let batch = format!(
        r#"[{load},
            {{"command": "set_wireframe", "enabled": true}},
            {{"command": "set_environment", "environment": "warehouse"}},
            {{"command": "set_clip_enabled", "enabled": true}},
            {{"command": "set_clip_axis", "axis": "y"}},
            {{"command": "set_clip_offset", "offset": -9.0}},
            {{"command": "inspect"}}]"#
    );
    let resps = execute_json_batch(&mut h, &batch).unwrap();
    assert_eq!(resps.len(), 7);
    assert!(resps.iter().all(|r| r.success), "{resps:?}");
    assert_eq!(resps[5].data.as_ref().unwrap()["offset"], -5.0);

    let inspect = resps[6].data.as_ref().unwrap();
    assert_eq!(inspect["status"]["state"], "ready");
    assert_eq!(inspect["controls"]["wireframe"], true);
    assert_eq!(inspect["controls"]["environment"], "warehouse");
    assert_eq!(inspect["controls"]["clip_axis"], "y");
    for mesh in inspect["meshes"].as_array().unwrap() {
        assert_eq!(mesh["wireframe"], true);
        assert_eq!(mesh["clip_planes"], 1);
    }
}

#[test]
fn test_command_highlight_then_clear() {
    let mut h = TestHarness::new();
    let load = serde_json::json!({ "command": "load_bytes", "name": "two.glb", "base64": glb_b64() });

    let batch = format!(
        r#"[{load},
            {{"command": "set_highlight_enabled", "enabled": true}},
            {{"command": "click", "x": 560, "y": 280}},
            {{"command": "click", "x": 4, "y": 4}},
            {{"command": "clear_model"}},
            {{"command": "inspect"}}]"#
    );
    let resps = execute_json_batch(&mut h, &batch).unwrap();
    assert!(resps.iter().all(|r| r.success));
    assert_eq!(resps[2].data.as_ref().unwrap()["outcome"], "selected");
    assert_eq!(resps[3].data.as_ref().unwrap()["outcome"], "miss");

    let inspect = resps[5].data.as_ref().unwrap();
    assert_eq!(inspect["status"]["state"], "empty");
    assert!(inspect["selection"].is_null());
    assert_eq!(inspect["live_sources"], 0);
    // Toggles outlive the model
    assert_eq!(inspect["controls"]["highlight_enabled"], true);
}

#[test]
fn test_command_unknown_rejected() {
    let mut h = TestHarness::new();
    assert!(execute_json(&mut h, r#"{"command": "explode"}"#).is_err());
    assert!(execute_json_batch(&mut h, r#"[{"command": "inspect"}, {"command": 3}]"#).is_err());
}
