//! Model info card: name, size, format badge

use egui::Ui;
use mesh_viewer_lib::LoadStatus;

use crate::app::styles::format_badge_color;
use crate::app::Session;
use crate::i18n::t;

pub fn show(ui: &mut Ui, session: &Session) {
    ui.heading(t("info.title"));
    ui.add_space(4.0);

    let viewer = &session.viewer;
    if let LoadStatus::Loading { .. } = viewer.status() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(t("info.loading"));
        });
    }

    let Some(info) = viewer.model_info() else {
        ui.weak(t("info.no_model"));
        return;
    };

    ui.horizontal(|ui| {
        ui.strong(info.display_name());
        let badge = egui::RichText::new(format!(" {} ", info.format.label()))
            .small()
            .strong()
            .color(egui::Color32::WHITE)
            .background_color(format_badge_color(info.format));
        ui.label(badge);
    });

    egui::Grid::new("model_info_grid")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label(t("info.size"));
            ui.monospace(info.size_label());
            ui.end_row();

            ui.label(t("info.meshes"));
            ui.monospace(info.mesh_count.to_string());
            ui.end_row();

            ui.label(t("info.triangles"));
            ui.monospace(info.triangle_count.to_string());
            ui.end_row();

            if info.detection.is_probed() {
                ui.label(t("info.detected"));
                ui.weak(t("info.by_content"));
                ui.end_row();
            }
        });
}
