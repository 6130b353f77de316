//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
mod overlays;
pub use mesh_viewer_lib::viewport::{camera, mesh, picking};

use std::sync::{Arc, Mutex};

use egui::Ui;
use mesh_viewer_lib::highlight::PickOutcome;

use crate::app::Session;
use camera::{ScreenPoint, ViewportRect};
use gl_renderer::{FrameScene, GlRenderer, RenderParams};

/// Degrees of rotation per dragged pixel
const ROTATE_SPEED: f32 = 0.5;
const PAN_SPEED: f32 = 0.01;
const ZOOM_SPEED: f32 = 0.01;

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self { gl_renderer: None }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("Failed to initialize GL renderer: {e}"),
        }
    }

    /// Release GPU resources
    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    pub fn show(&mut self, ui: &mut Ui, session: &mut Session) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        self.handle_camera(&response, ui, session);
        self.handle_click(&response, rect, session);

        // Damped rotation keeps moving after the pointer is released
        if session.viewer.camera_mut().tick() {
            ui.ctx().request_repaint();
        }

        if !ui.is_rect_visible(rect) {
            return;
        }

        self.render_gl(ui, rect, session);
        overlays::draw(ui, rect, session);
    }

    fn handle_camera(&self, response: &egui::Response, ui: &Ui, session: &mut Session) {
        let camera = session.viewer.camera_mut();

        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            camera.rotate(-delta.x * ROTATE_SPEED, delta.y * ROTATE_SPEED);
        }

        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            camera.pan(-delta.x * PAN_SPEED, delta.y * PAN_SPEED);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                camera.zoom(scroll * ZOOM_SPEED);
            }
        }
    }

    /// A click (press and release without drag) picks the mesh under the pointer
    fn handle_click(&self, response: &egui::Response, rect: egui::Rect, session: &mut Session) {
        if !response.clicked() {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };

        let outcome = session
            .viewer
            .handle_pointer_event(ScreenPoint::new(pos.x, pos.y), viewport_rect(rect));
        match outcome {
            PickOutcome::Disabled | PickOutcome::Unchanged(_) => {}
            PickOutcome::Miss => tracing::debug!("Click hit nothing"),
            PickOutcome::Selected(id) | PickOutcome::Switched { to: id, .. } => {
                if let Some(record) = session.viewer.meshes().get(id) {
                    tracing::debug!("Selected mesh '{}'", record.name);
                }
            }
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect, session: &Session) {
        let Some(gl_renderer) = &self.gl_renderer else {
            // No GL context: the panel still shows overlays
            return;
        };

        let renderer = gl_renderer.clone();
        let viewer = &session.viewer;
        let scene = Arc::new(FrameScene::capture(viewer.meshes()));
        let view_proj = viewer.camera().view_projection(viewport_rect(rect).aspect());
        let environment = viewer.environment();
        let placeholder = viewer.status().is_loading();
        let grid_settings = session.settings.viewport.grid.clone();

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer.lock() {
                    r.update_grid(gl, &grid_settings);
                    r.sync(gl, &scene);

                    let params = RenderParams {
                        viewport,
                        view_proj,
                        environment,
                        grid_visible: grid_settings.visible,
                        placeholder,
                    };
                    r.paint(gl, &scene, &params);
                }
            })),
        };

        ui.painter().add(callback);
    }
}

impl Default for ViewportPanel {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn viewport_rect(rect: egui::Rect) -> ViewportRect {
    ViewportRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}
