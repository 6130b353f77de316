//! Viewport overlay drawing (axis labels, hints, camera info)

use egui::{Painter, Ui};
use glam::Vec3;
use mesh_viewer_lib::LoadStatus;

use crate::app::Session;
use crate::i18n::t;

use super::camera::ArcBallCamera;
use super::viewport_rect;

pub fn draw(ui: &Ui, rect: egui::Rect, session: &Session) {
    let painter = ui.painter_at(rect);
    let viewer = &session.viewer;

    draw_axis_labels(&painter, rect, viewer.camera());
    draw_camera_info(&painter, rect, viewer.camera());

    match viewer.status() {
        LoadStatus::Loading { .. } => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                t("viewport.loading"),
                egui::FontId::proportional(16.0),
                egui::Color32::from_rgb(200, 200, 210),
            );
        }
        _ if !viewer.has_model() => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                t("viewport.empty_hint"),
                egui::FontId::proportional(18.0),
                egui::Color32::from_rgb(150, 150, 160),
            );
            painter.text(
                egui::pos2(rect.center().x, rect.bottom() - 20.0),
                egui::Align2::CENTER_BOTTOM,
                t("viewport.nav_hint"),
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(100, 100, 110),
            );
        }
        _ => {}
    }
}

/// Draw axis labels in the viewport
fn draw_axis_labels(painter: &Painter, rect: egui::Rect, camera: &ArcBallCamera) {
    let labels = [
        (Vec3::new(1.6, 0.0, 0.0), "X", egui::Color32::from_rgb(220, 70, 70)),
        (Vec3::new(0.0, 1.6, 0.0), "Y", egui::Color32::from_rgb(70, 200, 70)),
        (Vec3::new(0.0, 0.0, 1.6), "Z", egui::Color32::from_rgb(70, 110, 220)),
    ];

    for (pos, label, color) in labels {
        let Some(screen) = camera.project(pos, viewport_rect(rect)) else {
            continue;
        };
        let screen = egui::pos2(screen.x, screen.y);
        if rect.contains(screen) {
            painter.text(
                screen,
                egui::Align2::LEFT_BOTTOM,
                label,
                egui::FontId::monospace(12.0),
                color,
            );
        }
    }
}

fn draw_camera_info(painter: &Painter, rect: egui::Rect, camera: &ArcBallCamera) {
    let overlay_rect = egui::Rect::from_min_size(
        egui::pos2(rect.right() - 140.0, rect.top() + 4.0),
        egui::vec2(136.0, 44.0),
    );
    painter.rect_filled(
        overlay_rect,
        4.0,
        egui::Color32::from_rgba_premultiplied(0, 0, 0, 140),
    );
    painter.text(
        overlay_rect.min + egui::vec2(6.0, 4.0),
        egui::Align2::LEFT_TOP,
        format!(
            "Dist: {:.1}\nYaw: {:.0}  Pitch: {:.0}",
            camera.distance,
            camera.yaw.to_degrees(),
            camera.pitch.to_degrees(),
        ),
        egui::FontId::monospace(10.0),
        egui::Color32::from_rgb(160, 160, 170),
    );
}
