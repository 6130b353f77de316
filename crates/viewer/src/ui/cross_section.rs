//! Cross-section and click highlight toggles

use egui::Ui;
use shared::{ClipAxis, CLIP_OFFSET_MAX, CLIP_OFFSET_MIN, CLIP_OFFSET_STEP};

use crate::app::Session;
use crate::i18n::t;

pub fn show(ui: &mut Ui, session: &mut Session) {
    ui.heading(t("section.title"));
    ui.add_space(4.0);

    let viewer = &mut session.viewer;
    let controls = viewer.controls();

    let mut highlight = controls.highlight_enabled;
    if ui.checkbox(&mut highlight, t("section.highlight")).changed() {
        viewer.set_highlight_enabled(highlight);
    }

    let mut clip = controls.clip_enabled;
    if ui.checkbox(&mut clip, t("section.enable")).changed() {
        viewer.set_clip_enabled(clip);
    }

    // Axis and position only make sense while clipping is on
    if !controls.clip_enabled {
        return;
    }

    ui.horizontal(|ui| {
        ui.label(t("section.axis"));
        for axis in ClipAxis::all() {
            if ui
                .selectable_label(controls.clip_axis == *axis, axis.label())
                .clicked()
            {
                viewer.set_clip_axis(*axis);
            }
        }
    });

    ui.horizontal(|ui| {
        ui.label(t("section.position"));
        let mut offset = controls.clip_offset;
        let slider = egui::Slider::new(&mut offset, CLIP_OFFSET_MIN..=CLIP_OFFSET_MAX)
            .step_by(CLIP_OFFSET_STEP as f64)
            .fixed_decimals(1);
        if ui.add(slider).changed() {
            viewer.set_clip_offset(offset);
        }
    });
}
