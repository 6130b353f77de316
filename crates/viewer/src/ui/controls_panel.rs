//! Viewer controls: wireframe, environment, clear, help

use egui::Ui;
use shared::EnvironmentPreset;

use crate::app::Session;
use crate::i18n::t;

pub fn show(ui: &mut Ui, session: &mut Session) {
    ui.heading(t("controls.title"));
    ui.add_space(4.0);

    let viewer = &mut session.viewer;
    let has_model = viewer.has_model();
    let controls = viewer.controls();

    let mut wireframe = controls.wireframe;
    if ui
        .add_enabled(has_model, egui::Checkbox::new(&mut wireframe, t("controls.wireframe")))
        .changed()
    {
        viewer.set_wireframe(wireframe);
    }

    ui.horizontal(|ui| {
        ui.label(t("controls.environment"));
        let mut env = controls.environment;
        egui::ComboBox::from_id_salt("environment_combo")
            .selected_text(env.display_name())
            .show_ui(ui, |ui| {
                for preset in EnvironmentPreset::all() {
                    ui.selectable_value(&mut env, *preset, preset.display_name());
                }
            });
        if env != controls.environment {
            viewer.set_environment(env);
        }
    });

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(has_model, egui::Button::new(t("controls.clear")))
            .clicked()
        {
            viewer.clear_model();
        }
        if ui.button(t("controls.reset_camera")).clicked() {
            viewer.reset_camera();
        }
    });

    ui.add_space(6.0);
    egui::CollapsingHeader::new(t("controls.help"))
        .id_salt("controls_help")
        .default_open(false)
        .show(ui, |ui| {
            for key in ["help.rotate", "help.pan", "help.zoom", "help.click", "help.drop"] {
                ui.weak(t(key));
            }
        });
}
