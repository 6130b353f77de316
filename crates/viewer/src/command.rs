//! JSON command protocol for scripted control of the viewer.
//!
//! Every command maps onto one viewer operation, so anything a user can do
//! from the panels can be replayed from a script or a test.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use shared::{ClipAxis, EnvironmentPreset};

use crate::harness::TestHarness;
use crate::highlight::PickOutcome;
use crate::resource::IncomingFile;
use crate::viewport::camera::ViewportRect;

/// A command the viewer can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ViewerCommand {
    /// Load a model from inline content. Exactly one of `base64` or `text`.
    LoadBytes {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        base64: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    /// Load a model from disk
    LoadFile {
        path: String,
    },
    SetWireframe {
        enabled: bool,
    },
    SetEnvironment {
        environment: EnvironmentPreset,
    },
    SetClipAxis {
        axis: ClipAxis,
    },
    SetClipOffset {
        offset: f32,
    },
    SetClipEnabled {
        enabled: bool,
    },
    SetHighlightEnabled {
        enabled: bool,
    },
    /// Pointer click; the viewport size defaults to the harness viewport
    Click {
        x: f32,
        y: f32,
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
    },
    ClearModel,
    ResetCamera,
    /// Inspect everything observable
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn decode_payload(base64: Option<String>, text: Option<String>) -> Result<Vec<u8>, String> {
    match (base64, text) {
        (Some(b64), None) => base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| format!("Invalid base64 payload: {e}")),
        (None, Some(text)) => Ok(text.into_bytes()),
        (None, None) => Err("load_bytes needs `base64` or `text`".to_string()),
        (Some(_), Some(_)) => Err("load_bytes takes `base64` or `text`, not both".to_string()),
    }
}

fn load_response(harness: &TestHarness) -> CommandResponse {
    let meshes = harness.mesh_count();
    match harness.viewer.model_info() {
        Some(info) => CommandResponse::ok_with_data(serde_json::json!({
            "name": info.display_name(),
            "format": info.format,
            "probed": info.detection.is_probed(),
            "mesh_count": meshes,
        })),
        None => CommandResponse::ok(),
    }
}

fn pick_data(outcome: PickOutcome) -> serde_json::Value {
    match outcome {
        PickOutcome::Disabled => serde_json::json!({ "outcome": "disabled" }),
        PickOutcome::Miss => serde_json::json!({ "outcome": "miss" }),
        PickOutcome::Selected(id) => serde_json::json!({ "outcome": "selected", "mesh": id.0 }),
        PickOutcome::Unchanged(id) => serde_json::json!({ "outcome": "unchanged", "mesh": id.0 }),
        PickOutcome::Switched { from, to } => {
            serde_json::json!({ "outcome": "switched", "from": from.0, "mesh": to.0 })
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: ViewerCommand) -> CommandResponse {
    match cmd {
        ViewerCommand::LoadBytes { name, base64, text } => {
            let bytes = match decode_payload(base64, text) {
                Ok(bytes) => bytes,
                Err(e) => return CommandResponse::err(e),
            };
            match harness.load_bytes(name.as_deref(), bytes) {
                Ok(()) => load_response(harness),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        ViewerCommand::LoadFile { path } => {
            let loaded = IncomingFile::from_path(std::path::Path::new(&path))
                .map_err(crate::error::LoadError::from)
                .and_then(|file| harness.viewer.load_now(file));
            match loaded {
                Ok(()) => load_response(harness),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        ViewerCommand::SetWireframe { enabled } => {
            harness.viewer.set_wireframe(enabled);
            CommandResponse::ok()
        }

        ViewerCommand::SetEnvironment { environment } => {
            harness.viewer.set_environment(environment);
            CommandResponse::ok()
        }

        ViewerCommand::SetClipAxis { axis } => {
            harness.viewer.set_clip_axis(axis);
            CommandResponse::ok()
        }

        ViewerCommand::SetClipOffset { offset } => {
            let stored = harness.viewer.set_clip_offset(offset);
            CommandResponse::ok_with_data(serde_json::json!({ "offset": stored }))
        }

        ViewerCommand::SetClipEnabled { enabled } => {
            harness.viewer.set_clip_enabled(enabled);
            CommandResponse::ok()
        }

        ViewerCommand::SetHighlightEnabled { enabled } => {
            harness.viewer.set_highlight_enabled(enabled);
            CommandResponse::ok()
        }

        ViewerCommand::Click { x, y, width, height } => {
            if let (Some(w), Some(h)) = (width, height) {
                harness.viewport = ViewportRect::new(0.0, 0.0, w, h);
            }
            let outcome = harness.click(x, y);
            CommandResponse::ok_with_data(pick_data(outcome))
        }

        ViewerCommand::ClearModel => {
            harness.clear();
            CommandResponse::ok()
        }

        ViewerCommand::ResetCamera => {
            harness.viewer.reset_camera();
            CommandResponse::ok()
        }

        ViewerCommand::Inspect => CommandResponse::ok_with_data(harness.inspect()),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: ViewerCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<ViewerCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
