use egui::Ui;
use mesh_viewer_lib::LoadStatus;

use crate::app::{NoticeKind, Session};
use crate::i18n::t;

pub fn show(ui: &mut Ui, session: &Session) {
    ui.horizontal(|ui| {
        let viewer = &session.viewer;
        ui.weak(format!("{}: {}", t("status.meshes"), viewer.meshes().len()));

        if let Some(id) = viewer.selection() {
            ui.separator();
            let name = viewer
                .meshes()
                .get(id)
                .map(|r| r.name.as_str())
                .unwrap_or_default();
            ui.label(format!("{}: {name}", t("status.selected")));
        }

        ui.separator();
        match &session.notice {
            Some(notice) => {
                let color = match notice.kind {
                    NoticeKind::Success => egui::Color32::from_rgb(120, 200, 120),
                    NoticeKind::Error => egui::Color32::from_rgb(235, 110, 100),
                    NoticeKind::Info => egui::Color32::from_rgb(170, 170, 190),
                };
                ui.colored_label(color, &notice.text);
            }
            None => match viewer.status() {
                LoadStatus::Loading { .. } => {
                    ui.colored_label(egui::Color32::from_rgb(255, 200, 100), t("status.loading"));
                }
                LoadStatus::Failed(msg) => {
                    ui.colored_label(egui::Color32::from_rgb(235, 110, 100), msg);
                }
                LoadStatus::Empty | LoadStatus::Ready => {
                    ui.weak(t("status.ready"));
                }
            },
        }

        // Right-aligned version
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("Mesh Viewer v", env!("CARGO_PKG_VERSION")));
        });
    });
}
