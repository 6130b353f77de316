//! Headless test harness for driving the viewer without a window.
//!
//! Wraps a [`ModelViewer`] with a fixed viewport so loads, clicks and control
//! changes can be scripted from tests and from the JSON command layer.

use std::time::{Duration, Instant};

use glam::Vec3;
use serde_json::json;

use crate::error::LoadError;
use crate::loader::{self, LoadQueue, LoadRequest, DEFAULT_TIMEOUT};
use crate::normalize::MeshId;
use crate::resource::IncomingFile;
use crate::validation::MeshValidator;
use crate::viewer::{LoadStatus, ModelViewer, ViewerConfig};
use crate::viewport::camera::{ArcBallCamera, ScreenPoint, ViewportRect};

/// Viewport the harness pretends to render into
pub const DEFAULT_VIEWPORT: ViewportRect = ViewportRect {
    x: 0.0,
    y: 0.0,
    width: 800.0,
    height: 600.0,
};

/// Owns a viewer and, on demand, a load queue
pub struct TestHarness {
    pub viewer: ModelViewer,
    pub viewport: ViewportRect,
    queue: Option<LoadQueue>,
}

impl TestHarness {
    /// Create a new empty harness. Rotation is undamped so clicks land predictably.
    pub fn new() -> Self {
        Self::with_config(&ViewerConfig::default())
    }

    pub fn with_config(config: &ViewerConfig) -> Self {
        Self {
            viewer: ModelViewer::with_config(ArcBallCamera::with_damping(0.0), config),
            viewport: DEFAULT_VIEWPORT,
            queue: None,
        }
    }

    // ── Loading ───────────────────────────────────────────────

    /// Load a file synchronously
    pub fn load_bytes(&mut self, name: Option<&str>, bytes: Vec<u8>) -> Result<(), LoadError> {
        self.viewer.load_now(IncomingFile::new(name, bytes))
    }

    /// Start a load without finishing it
    pub fn begin_load(&mut self, name: Option<&str>, bytes: Vec<u8>) -> Result<LoadRequest, LoadError> {
        self.viewer.upload(IncomingFile::new(name, bytes))
    }

    /// Parse a started load on this thread and hand it to the viewer
    pub fn finish_load(&mut self, request: &LoadRequest) -> Result<(), LoadError> {
        self.viewer.complete_load(loader::load_blocking(request))
    }

    /// Start a load on the background queue
    pub fn load_in_background(&mut self, name: Option<&str>, bytes: Vec<u8>) -> Result<(), LoadError> {
        let request = self.begin_load(name, bytes)?;
        if self.queue.is_none() {
            self.queue = Some(LoadQueue::new(DEFAULT_TIMEOUT)?);
        }
        if let Some(queue) = self.queue.as_mut() {
            queue.submit(request);
        }
        Ok(())
    }

    /// Pump the background queue until it is empty or `wait` runs out.
    /// Returns how many outcomes were applied.
    pub fn wait_for_loads(&mut self, wait: Duration) -> usize {
        let Some(queue) = self.queue.as_mut() else {
            return 0;
        };
        let deadline = Instant::now() + wait;
        let mut applied = 0;
        while queue.in_flight() > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            if let Some(outcome) = queue.wait_next(left) {
                let _ = self.viewer.complete_load(outcome);
                applied += 1;
            }
        }
        applied
    }

    pub fn clear(&mut self) {
        self.viewer.clear_model();
    }

    // ── Pointer ───────────────────────────────────────────────

    /// Click at viewport coordinates
    pub fn click(&mut self, x: f32, y: f32) -> crate::highlight::PickOutcome {
        self.viewer
            .handle_pointer_event(ScreenPoint::new(x, y), self.viewport)
    }

    /// Screen position of a world point under the current camera
    pub fn screen_of(&self, point: Vec3) -> Option<ScreenPoint> {
        self.viewer.camera().project(point, self.viewport)
    }

    /// Click near the projected center of a mesh's bounds, nudged off the
    /// face diagonals so the ray does not graze a shared triangle edge
    pub fn click_mesh(&mut self, id: MeshId) -> Option<crate::highlight::PickOutcome> {
        let bounds = self.viewer.meshes().get(id)?.bounds;
        let target = bounds.center() + bounds.size() * Vec3::new(0.12, 0.07, 0.0);
        let p = self.screen_of(target)?;
        Some(self.click(p.x, p.y))
    }

    /// First mesh whose name matches
    pub fn mesh_named(&self, name: &str) -> Option<MeshId> {
        self.viewer
            .meshes()
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.id)
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn mesh_count(&self) -> usize {
        self.viewer.meshes().len()
    }

    /// Validation problems per mesh, empty when all geometry is sound
    pub fn validate_meshes(&self) -> Vec<(MeshId, String)> {
        self.viewer
            .meshes()
            .iter()
            .flat_map(|r| {
                MeshValidator::new(&r.geometry)
                    .validate_all()
                    .into_iter()
                    .map(move |e| (r.id, e))
            })
            .collect()
    }

    /// Snapshot of everything observable, as JSON
    pub fn inspect(&self) -> serde_json::Value {
        let v = &self.viewer;
        let status = match v.status() {
            LoadStatus::Empty => json!({ "state": "empty" }),
            LoadStatus::Loading { generation } => json!({ "state": "loading", "generation": generation.0 }),
            LoadStatus::Ready => json!({ "state": "ready" }),
            LoadStatus::Failed(msg) => json!({ "state": "failed", "error": msg }),
        };
        let model = v.model_info().map(|info| {
            json!({
                "name": info.display_name(),
                "size": info.size_label(),
                "format": info.format,
                "probed": info.detection.is_probed(),
                "triangles": info.triangle_count,
            })
        });
        let meshes: Vec<serde_json::Value> = v
            .meshes()
            .iter()
            .map(|r| {
                json!({
                    "id": r.id.0,
                    "name": r.name,
                    "color": r.material.color(),
                    "wireframe": r.material.wireframe(),
                    "clip_planes": r.material.clip_planes().len(),
                    "triangles": r.geometry.triangle_count(),
                })
            })
            .collect();
        json!({
            "status": status,
            "model": model,
            "mesh_count": meshes.len(),
            "meshes": meshes,
            "selection": v.selection().map(|id| id.0),
            "controls": v.controls(),
            "live_sources": v.resources().live_count(),
        })
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
