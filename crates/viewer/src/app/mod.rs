//! Main application module

mod keyboard;
mod menus;
pub(crate) mod styles;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;

use mesh_viewer_lib::loader::{self, LoadQueue};
use mesh_viewer_lib::resource::IncomingFile;
use mesh_viewer_lib::state::AppSettings;
use mesh_viewer_lib::viewport::camera::ArcBallCamera;
use mesh_viewer_lib::{LoadError, ModelViewer, ViewerEvent};
use shared::ModelFormat;

use crate::i18n::t;
use crate::ui::{controls_panel, cross_section, model_info, status_bar};
use crate::viewport::ViewportPanel;

/// How long a notice stays in the status bar
const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Transient status bar message
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    since: Instant,
}

impl Notice {
    pub fn is_expired(&self) -> bool {
        self.since.elapsed() > NOTICE_TTL
    }
}

/// Viewer plus everything the panels need around it
pub struct Session {
    pub viewer: ModelViewer,
    pub settings: AppSettings,
    /// `None` when the loader runtime could not start; loads then run inline
    queue: Option<LoadQueue>,
    pub notice: Option<Notice>,
    pub show_settings_window: bool,
}

impl Session {
    pub fn new(settings: AppSettings) -> Self {
        let camera = ArcBallCamera::with_damping(settings.camera.damping);
        let viewer = ModelViewer::with_config(camera, &settings.viewer_config());
        let queue = match LoadQueue::new(settings.loading.timeout()) {
            Ok(q) => Some(q),
            Err(e) => {
                tracing::warn!("Background loader unavailable, loading inline: {e}");
                None
            }
        };
        Self {
            viewer,
            settings,
            queue,
            notice: None,
            show_settings_window: false,
        }
    }

    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
            since: Instant::now(),
        });
    }

    /// Start loading a file. Rejections show up as a notice.
    pub fn open(&mut self, file: IncomingFile) {
        let request = match self.viewer.upload(file) {
            Ok(r) => r,
            Err(e) => {
                self.report(&e);
                return;
            }
        };
        match self.queue.as_mut() {
            Some(queue) => queue.submit(request),
            None => {
                let _ = self.viewer.complete_load(loader::load_blocking(&request));
            }
        }
    }

    pub fn open_path(&mut self, path: &Path) {
        match IncomingFile::from_path(path) {
            Ok(file) => self.open(file),
            Err(e) => self.report(&LoadError::from(e)),
        }
    }

    pub fn open_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title(t("menu.open_title"))
            .add_filter(t("dialog.models"), ModelFormat::extensions())
            .pick_file()
        {
            self.open_path(&path);
        }
    }

    /// Apply finished loads and turn viewer events into notices.
    /// Returns true while a load is still running.
    pub fn pump(&mut self) -> bool {
        if let Some(queue) = self.queue.as_mut() {
            self.viewer.drive(queue);
        }
        for event in self.viewer.take_events() {
            match event {
                ViewerEvent::Loaded { name } => {
                    self.notify(NoticeKind::Success, format!("{}: {name}", t("notice.loaded")))
                }
                ViewerEvent::LoadFailed { message } => {
                    self.notify(NoticeKind::Error, format!("{}: {message}", t("notice.failed")))
                }
                ViewerEvent::Cleared => self.notify(NoticeKind::Info, t("notice.cleared")),
            }
        }
        if self.notice.as_ref().is_some_and(Notice::is_expired) {
            self.notice = None;
        }
        self.viewer.status().is_loading()
    }

    fn report(&mut self, error: &LoadError) {
        if error.is_user_visible() {
            tracing::warn!("{error}");
            self.notify(NoticeKind::Error, format!("{}: {error}", t("notice.failed")));
        }
    }

    /// Push settings that affect the running viewer
    pub fn apply_settings(&mut self) {
        self.viewer
            .set_highlight_color(self.settings.viewport.highlight_rgba());
        self.viewer.set_probe_order(self.settings.loading.probe_order);
        self.viewer.camera_mut().damping = self.settings.camera.damping.clamp(0.0, 1.0);
        if let Some(queue) = self.queue.as_mut() {
            queue.set_timeout(self.settings.loading.timeout());
        }
    }
}

/// Main application
pub struct ViewerApp {
    session: Session,
    viewport: ViewportPanel,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_model: Option<PathBuf>) -> Self {
        let settings = AppSettings::load();

        // Apply initial styles with font size from settings
        styles::configure_styles(&cc.egui_ctx, settings.ui.font_size);
        let last_font_size = settings.ui.font_size;

        let mut viewport = ViewportPanel::new();
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let mut session = Session::new(settings);
        if let Some(path) = initial_model {
            session.open_path(&path);
        }

        Self {
            session,
            viewport,
            last_font_size,
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // Only the last file counts; each upload supersedes the previous one
        let Some(file) = dropped.into_iter().last() else {
            return;
        };
        if let Some(bytes) = file.bytes {
            let name = (!file.name.is_empty()).then_some(file.name.as_str());
            self.session.open(IncomingFile::new(name, bytes.to_vec()));
        } else if let Some(path) = file.path {
            self.session.open_path(&path);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.session.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.session.settings.ui.font_size);
            self.last_font_size = self.session.settings.ui.font_size;
        }

        self.handle_dropped_files(ctx);
        keyboard::handle_keyboard(ctx, &mut self.session);

        if self.session.pump() || self.session.notice.is_some() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.session);
                menus::view_menu(ui, &mut self.session);
                menus::settings_menu(ui, &mut self.session);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.session);

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.session);
            });

        // ── Right panel: controls ────────────────────────────
        egui::SidePanel::right("controls_panel")
            .default_width(270.0)
            .width_range(220.0..=420.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    model_info::show(ui, &self.session);
                    ui.separator();
                    controls_panel::show(ui, &mut self.session);
                    ui.separator();
                    cross_section::show(ui, &mut self.session);
                });
            });

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.session);
            });
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.viewport.destroy_gl(gl);
        }
        self.session.settings.save();
    }
}
