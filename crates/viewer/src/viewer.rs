//! Viewer orchestrator.
//!
//! Owns the byte sources, the mesh set, clip and highlight state and the
//! camera controller, and is the only writer of any of them. Everything runs
//! on the caller's thread; parsing is handed to a [`LoadQueue`] and comes back
//! through [`ModelViewer::drive`].

use shared::{format_file_size, ClipAxis, EnvironmentPreset, ModelFormat, ViewerControls};

use crate::clipping::{ClipPlane, ClipState, ClippingController};
use crate::document::SceneDocument;
use crate::error::LoadError;
use crate::format::{self, Detection, ProbeOrder};
use crate::highlight::{HighlightEngine, PickOutcome, DEFAULT_HIGHLIGHT_COLOR};
use crate::loader::{self, LoadGeneration, LoadOutcome, LoadQueue, LoadRequest};
use crate::normalize::{DisplayState, MeshId, MeshSet, Rgba};
use crate::resource::{IncomingFile, ResourceManager, SourceHandle};
use crate::viewport::camera::{
    ArcBallCamera, CameraController, CameraPose, RayCaster, ScreenPoint, ViewportRect,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadStatus {
    #[default]
    Empty,
    Loading {
        generation: LoadGeneration,
    },
    Ready,
    /// Last load failed; the previous model (if any) is still shown
    Failed(String),
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Facts about the displayed model for the info panel
#[derive(Clone, Debug, PartialEq)]
pub struct ModelInfo {
    pub name: Option<String>,
    pub size_bytes: usize,
    pub format: ModelFormat,
    pub detection: Detection,
    pub mesh_count: usize,
    pub triangle_count: usize,
}

impl ModelInfo {
    pub fn size_label(&self) -> String {
        format_file_size(self.size_bytes as u64)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled")
    }
}

/// Notifications for the status bar
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
    Loaded { name: String },
    LoadFailed { message: String },
    Cleared,
}

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub probe_order: ProbeOrder,
    pub highlight_color: Rgba,
    pub environment: EnvironmentPreset,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            probe_order: ProbeOrder::default(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
            environment: EnvironmentPreset::default(),
        }
    }
}

pub struct ModelViewer<C = ArcBallCamera> {
    resources: ResourceManager,
    meshes: MeshSet,
    document: Option<SceneDocument>,
    clipping: ClippingController,
    highlight: HighlightEngine,
    camera: C,
    wireframe: bool,
    environment: EnvironmentPreset,
    probe_order: ProbeOrder,
    generation: LoadGeneration,
    /// Source backing the displayed model
    current: Option<SourceHandle>,
    /// Source of the load in flight
    pending: Option<SourceHandle>,
    status: LoadStatus,
    info: Option<ModelInfo>,
    events: Vec<ViewerEvent>,
}

impl Default for ModelViewer<ArcBallCamera> {
    fn default() -> Self {
        Self::new(ArcBallCamera::new())
    }
}

impl<C: CameraController + RayCaster> ModelViewer<C> {
    pub fn new(camera: C) -> Self {
        Self::with_config(camera, &ViewerConfig::default())
    }

    pub fn with_config(camera: C, config: &ViewerConfig) -> Self {
        Self {
            resources: ResourceManager::new(),
            meshes: MeshSet::new(),
            document: None,
            clipping: ClippingController::new(),
            highlight: HighlightEngine::new(config.highlight_color),
            camera,
            wireframe: false,
            environment: config.environment,
            probe_order: config.probe_order,
            generation: LoadGeneration::default(),
            current: None,
            pending: None,
            status: LoadStatus::Empty,
            info: None,
            events: Vec::new(),
        }
    }

    // ── Loading ──────────────────────────────────────────────

    /// Register an uploaded file and start a new load generation.
    ///
    /// Unsupported extensions are rejected here without touching any state.
    pub fn upload(&mut self, file: IncomingFile) -> Result<LoadRequest, LoadError> {
        format::check_extension(file.name.as_deref())?;

        let source = self.resources.acquire(file);
        if let Some(superseded) = self.pending.replace(source.handle()) {
            self.resources.release(superseded);
        }
        self.generation = self.generation.next();
        self.status = LoadStatus::Loading {
            generation: self.generation,
        };
        tracing::info!(
            "Loading {} ({}) as {}",
            source.name().unwrap_or("<unnamed>"),
            format_file_size(source.len() as u64),
            self.generation
        );

        Ok(LoadRequest {
            generation: self.generation,
            source,
            probe_order: self.probe_order,
        })
    }

    /// Upload and parse on the calling thread
    pub fn load_now(&mut self, file: IncomingFile) -> Result<(), LoadError> {
        let request = self.upload(file)?;
        self.complete_load(loader::load_blocking(&request))
    }

    /// Apply a finished load. Stale generations are dropped silently.
    pub fn complete_load(&mut self, outcome: LoadOutcome) -> Result<(), LoadError> {
        if outcome.generation != self.generation {
            // Already released when it was superseded; releasing again is a no-op
            self.resources.release(outcome.handle);
            tracing::debug!("Dropping stale load {} (current {})", outcome.generation, self.generation);
            return Err(LoadError::StaleLoad {
                generation: outcome.generation,
                current: self.generation,
            });
        }
        self.pending = None;

        let installed = outcome
            .result
            .and_then(|(detection, doc)| self.install(doc, detection, outcome.name, outcome.size));

        match installed {
            Ok(()) => {
                if let Some(previous) = self.current.replace(outcome.handle) {
                    self.resources.release(previous);
                }
                self.status = LoadStatus::Ready;
                Ok(())
            }
            Err(e) => {
                self.resources.release(outcome.handle);
                tracing::warn!("Load {} failed: {e}", outcome.generation);
                self.status = LoadStatus::Failed(e.to_string());
                self.events.push(ViewerEvent::LoadFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn install(
        &mut self,
        doc: SceneDocument,
        detection: Detection,
        name: Option<String>,
        size: usize,
    ) -> Result<(), LoadError> {
        let display = self.display_state();
        self.meshes.normalize(&doc, &display)?;
        // Old selection pointed into the replaced set
        self.highlight.reset();

        let info = ModelInfo {
            name,
            size_bytes: size,
            format: doc.format,
            detection,
            mesh_count: self.meshes.len(),
            triangle_count: self.meshes.triangle_count(),
        };
        tracing::info!(
            "Loaded {} [{}{}]: {} mesh(es), {} triangles",
            info.display_name(),
            info.format.label(),
            if detection.is_probed() { ", probed" } else { "" },
            info.mesh_count,
            info.triangle_count
        );
        self.events.push(ViewerEvent::Loaded {
            name: info.display_name().to_string(),
        });
        self.info = Some(info);
        self.document = Some(doc);
        Ok(())
    }

    /// Apply every finished load from the queue. Returns how many arrived.
    pub fn drive(&mut self, queue: &mut LoadQueue) -> usize {
        let outcomes = queue.poll();
        let count = outcomes.len();
        for outcome in outcomes {
            // Failures are already recorded in status and events
            let _ = self.complete_load(outcome);
        }
        count
    }

    /// Drop the model and any load in flight
    pub fn clear_model(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.resources.release(handle);
            // Whatever is still parsing becomes stale
            self.generation = self.generation.next();
        }
        if let Some(handle) = self.current.take() {
            self.resources.release(handle);
        }
        self.highlight.reset();
        self.meshes.clear();
        self.document = None;
        self.info = None;
        self.status = LoadStatus::Empty;
        self.events.push(ViewerEvent::Cleared);
        tracing::info!("Model cleared");
    }

    // ── Controls ─────────────────────────────────────────────

    fn display_state(&self) -> DisplayState {
        DisplayState {
            wireframe: self.wireframe,
            clip: self.clipping.active_plane(),
        }
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
        if let Some(doc) = &self.document {
            let display = self.display_state();
            // Same document: flags only
            if let Err(e) = self.meshes.normalize(doc, &display) {
                tracing::warn!("Display refresh failed: {e}");
            }
        }
    }

    pub fn set_environment(&mut self, environment: EnvironmentPreset) {
        self.environment = environment;
    }

    pub fn set_clip_axis(&mut self, axis: ClipAxis) {
        self.clipping.set_axis(axis, &mut self.meshes);
    }

    /// Returns the stored (clamped) offset
    pub fn set_clip_offset(&mut self, offset: f32) -> f32 {
        self.clipping.set_offset(offset, &mut self.meshes)
    }

    pub fn set_clip_enabled(&mut self, enabled: bool) {
        self.clipping.set_enabled(enabled, &mut self.meshes);
    }

    pub fn set_highlight_enabled(&mut self, enabled: bool) {
        self.highlight.set_enabled(enabled, &mut self.meshes);
    }

    pub fn set_highlight_color(&mut self, color: Rgba) {
        self.highlight.set_color(color, &mut self.meshes);
    }

    pub fn set_probe_order(&mut self, order: ProbeOrder) {
        self.probe_order = order;
    }

    pub fn handle_pointer_event(&mut self, point: ScreenPoint, rect: ViewportRect) -> PickOutcome {
        self.highlight
            .handle_pointer_event(&mut self.meshes, &self.camera, point, rect)
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    // ── Observables ──────────────────────────────────────────

    pub fn has_model(&self) -> bool {
        !self.meshes.is_empty()
    }

    pub fn selection(&self) -> Option<MeshId> {
        self.highlight.selection()
    }

    /// Clip plane in effect, `None` while clipping is disabled
    pub fn clip_plane(&self) -> Option<ClipPlane> {
        self.clipping.active_plane()
    }

    pub fn clip_state(&self) -> ClipState {
        self.clipping.state()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.info.as_ref()
    }

    pub fn meshes(&self) -> &MeshSet {
        &self.meshes
    }

    pub fn controls(&self) -> ViewerControls {
        let clip = self.clipping.state();
        ViewerControls {
            wireframe: self.wireframe,
            environment: self.environment,
            clip_axis: clip.axis,
            clip_offset: clip.offset,
            clip_enabled: clip.enabled,
            highlight_enabled: self.highlight.enabled(),
        }
    }

    pub fn environment(&self) -> EnvironmentPreset {
        self.environment
    }

    pub fn highlight_color(&self) -> Rgba {
        self.highlight.color()
    }

    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Notifications since the last call
    pub fn take_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use glam::Vec3;

    fn viewer() -> ModelViewer {
        ModelViewer::default()
    }

    fn glb() -> IncomingFile {
        IncomingFile::new(Some("two.glb"), fixtures::two_mesh_glb())
    }

    fn stl(name: Option<&str>) -> IncomingFile {
        IncomingFile::new(
            name,
            fixtures::binary_stl(&fixtures::offset_cube_triangles(Vec3::new(3.0, 3.0, 3.0))),
        )
    }

    #[test]
    fn test_initial_state() {
        let v = viewer();
        assert!(!v.has_model());
        assert_eq!(v.status(), &LoadStatus::Empty);
        assert_eq!(v.selection(), None);
        assert_eq!(v.clip_plane(), None);
        assert_eq!(v.controls(), ViewerControls::default());
    }

    #[test]
    fn test_load_now_installs_model() {
        let mut v = viewer();
        v.load_now(glb()).unwrap();
        assert!(v.has_model());
        assert_eq!(v.status(), &LoadStatus::Ready);
        let info = v.model_info().unwrap();
        assert_eq!(info.mesh_count, 2);
        assert_eq!(info.format, ModelFormat::Glb);
        assert_eq!(v.resources().live_count(), 1);
        assert_eq!(
            v.take_events(),
            vec![ViewerEvent::Loaded {
                name: "two.glb".into()
            }]
        );
    }

    #[test]
    fn test_unsupported_extension_mutates_nothing() {
        let mut v = viewer();
        let err = v.upload(IncomingFile::new(Some("model.obj"), vec![0; 10])).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
        assert_eq!(v.status(), &LoadStatus::Empty);
        assert_eq!(v.generation(), LoadGeneration(0));
        assert_eq!(v.resources().live_count(), 0);
    }

    #[test]
    fn test_malformed_keeps_previous_model() {
        let mut v = viewer();
        v.load_now(glb()).unwrap();
        let err = v
            .load_now(IncomingFile::new(Some("broken.glb"), b"glTF junk".to_vec()))
            .unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument(_)));
        assert!(v.has_model());
        assert_eq!(v.meshes().len(), 2);
        assert!(matches!(v.status(), LoadStatus::Failed(_)));
        // Only the displayed model's source stays live
        assert_eq!(v.resources().live_count(), 1);
    }

    #[test]
    fn test_oversized_accessor_fails_without_panic() {
        let mut v = viewer();
        v.load_now(glb()).unwrap();
        let bytes = fixtures::oversized_accessor_gltf().into_bytes();
        let err = v.load_now(IncomingFile::new(Some("huge.gltf"), bytes.clone())).unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument(_)));
        // Every trial parse fails without a name to go on
        let err = v.load_now(IncomingFile::new(None, bytes)).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
        assert_eq!(v.meshes().len(), 2);
        assert!(matches!(v.status(), LoadStatus::Failed(_)));
    }

    #[test]
    fn test_format_badge_follows_content() {
        let mut v = viewer();
        let bytes = fixtures::embedded_gltf().into_bytes();
        v.load_now(IncomingFile::new(Some("mislabeled.glb"), bytes)).unwrap();
        let info = v.model_info().unwrap();
        assert_eq!(info.format, ModelFormat::Gltf);
        assert_eq!(info.detection, Detection::Hinted(ModelFormat::Glb));
    }

    #[test]
    fn test_new_model_releases_previous_source() {
        let mut v = viewer();
        v.load_now(glb()).unwrap();
        v.load_now(stl(Some("part.stl"))).unwrap();
        assert_eq!(v.resources().live_count(), 1);
        assert_eq!(v.resources().released_count(), 1);
        assert_eq!(v.meshes().len(), 1);
    }

    #[test]
    fn test_stale_load_dropped() {
        let mut v = viewer();
        let a = v.upload(glb()).unwrap();
        let b = v.upload(stl(None)).unwrap();
        // A's source was released the moment B superseded it
        assert!(!v.resources().is_live(a.source.handle()));

        v.complete_load(loader::load_blocking(&b)).unwrap();
        let err = v.complete_load(loader::load_blocking(&a)).unwrap_err();
        assert!(matches!(err, LoadError::StaleLoad { .. }));
        assert!(!err.is_user_visible());
        assert_eq!(v.model_info().unwrap().format, ModelFormat::Stl);
        assert_eq!(v.meshes().len(), 1);
        assert_eq!(v.status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_clear_model() {
        let mut v = viewer();
        v.load_now(glb()).unwrap();
        v.set_highlight_enabled(true);
        v.clear_model();
        assert!(!v.has_model());
        assert_eq!(v.selection(), None);
        assert_eq!(v.status(), &LoadStatus::Empty);
        assert_eq!(v.resources().live_count(), 0);
    }

    #[test]
    fn test_clear_during_load_makes_result_stale() {
        let mut v = viewer();
        let req = v.upload(glb()).unwrap();
        v.clear_model();
        let err = v.complete_load(loader::load_blocking(&req)).unwrap_err();
        assert!(matches!(err, LoadError::StaleLoad { .. }));
        assert!(!v.has_model());
    }

    #[test]
    fn test_controls_persist_across_models() {
        let mut v = viewer();
        v.set_wireframe(true);
        v.set_clip_enabled(true);
        v.set_clip_axis(ClipAxis::Y);
        assert_eq!(v.set_clip_offset(9.0), 5.0);
        v.load_now(glb()).unwrap();
        let plane = ClipPlane::from_axis(ClipAxis::Y, 5.0);
        for r in v.meshes().iter() {
            assert!(r.material.wireframe());
            assert_eq!(r.material.clip_planes(), &[plane]);
        }
        let c = v.controls();
        assert!(c.wireframe && c.clip_enabled);
        assert_eq!(c.clip_axis, ClipAxis::Y);
    }

    #[test]
    fn test_wireframe_toggle_keeps_highlight() {
        let mut v = viewer();
        v.load_now(glb()).unwrap();
        v.set_highlight_enabled(true);
        // Camera at (0,0,5) looking at the origin; aim at the right cube
        let rect = ViewportRect::new(0.0, 0.0, 800.0, 600.0);
        let out = v.handle_pointer_event(ScreenPoint::new(560.0, 280.0), rect);
        assert!(matches!(out, PickOutcome::Selected(_)));
        let selected = v.selection().unwrap();
        v.set_wireframe(true);
        assert_eq!(v.selection(), Some(selected));
        assert_eq!(
            v.meshes().get(selected).unwrap().material.color(),
            DEFAULT_HIGHLIGHT_COLOR
        );
    }

    #[test]
    fn test_reset_camera() {
        let mut v = viewer();
        v.camera_mut().zoom(0.5);
        v.reset_camera();
        assert!((v.camera_pose().eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }
}
