//! Application menu bar and settings window

use eframe::egui;
use mesh_viewer_lib::format::ProbeOrder;
use mesh_viewer_lib::state::AppSettings;
use shared::EnvironmentPreset;

use super::Session;
use crate::i18n::{lang, set_lang, t, Lang};

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, session: &mut Session) {
    ui.menu_button(t("menu.file"), |ui| {
        if ui.button(t("menu.open")).clicked() {
            ui.close_menu();
            session.open_dialog();
        }
        if ui
            .add_enabled(session.viewer.has_model(), egui::Button::new(t("menu.clear")))
            .clicked()
        {
            session.viewer.clear_model();
            ui.close_menu();
        }
        ui.separator();
        if ui.button(t("menu.quit")).clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, session: &mut Session) {
    ui.menu_button(t("menu.view"), |ui| {
        ui.checkbox(&mut session.settings.viewport.grid.visible, t("menu.grid"));
        if ui.button(t("menu.reset_camera")).clicked() {
            session.viewer.reset_camera();
            ui.close_menu();
        }
        ui.separator();
        ui.menu_button(t("menu.language"), |ui| {
            if ui.selectable_label(lang() == Lang::Ru, "Русский").clicked() {
                set_lang(Lang::Ru);
                ui.close_menu();
            }
            if ui.selectable_label(lang() == Lang::En, "English").clicked() {
                set_lang(Lang::En);
                ui.close_menu();
            }
        });
    });
}

pub fn settings_menu(ui: &mut egui::Ui, session: &mut Session) {
    ui.menu_button(t("menu.settings"), |ui| {
        if ui.button(t("menu.preferences")).clicked() {
            session.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, session: &mut Session) {
    let mut open = session.show_settings_window;
    egui::Window::new(t("settings.title"))
        .open(&mut open)
        .resizable(true)
        .default_width(380.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_viewport_settings(ui, &mut session.settings);
                show_loading_settings(ui, &mut session.settings);
                show_camera_settings(ui, &mut session.settings);
                show_ui_settings(ui, &mut session.settings);
                show_settings_buttons(ui, session);
            });
        });
    session.show_settings_window = open && session.show_settings_window;
}

fn show_viewport_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading(t("settings.viewport"));
    ui.horizontal(|ui| {
        ui.label(t("settings.highlight_color"));
        let [r, g, b] = settings.viewport.highlight_color;
        let mut color = egui::Color32::from_rgb(r, g, b);
        if ui.color_edit_button_srgba(&mut color).changed() {
            settings.viewport.highlight_color = [color.r(), color.g(), color.b()];
        }
    });
    ui.checkbox(&mut settings.viewport.antialiasing, t("settings.antialiasing"));

    let grid = &mut settings.viewport.grid;
    ui.checkbox(&mut grid.visible, t("settings.grid_visible"));
    ui.horizontal(|ui| {
        ui.label(t("settings.grid_size"));
        ui.add(egui::DragValue::new(&mut grid.size).speed(0.1).range(0.1..=10.0));
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.grid_range"));
        ui.add(egui::DragValue::new(&mut grid.range).speed(1).range(1..=50));
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.grid_opacity"));
        ui.add(egui::Slider::new(&mut grid.opacity, 0.0..=1.0));
    });
    ui.add_space(10.0);
}

fn show_loading_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading(t("settings.loading"));
    ui.horizontal(|ui| {
        ui.label(t("settings.probe_order"));
        let order = &mut settings.loading.probe_order;
        egui::ComboBox::from_id_salt("probe_order_combo")
            .selected_text(probe_order_label(*order))
            .show_ui(ui, |ui| {
                for option in [ProbeOrder::StlFirst, ProbeOrder::GltfFirst] {
                    ui.selectable_value(order, option, probe_order_label(option));
                }
            });
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.timeout"));
        ui.add(
            egui::DragValue::new(&mut settings.loading.timeout_secs)
                .speed(1)
                .range(1..=600)
                .suffix(" s"),
        );
    });
    ui.add_space(10.0);
}

fn probe_order_label(order: ProbeOrder) -> &'static str {
    match order {
        ProbeOrder::StlFirst => t("settings.stl_first"),
        ProbeOrder::GltfFirst => t("settings.gltf_first"),
    }
}

fn show_camera_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading(t("settings.camera"));
    ui.horizontal(|ui| {
        ui.label(t("settings.damping"));
        ui.add(egui::Slider::new(&mut settings.camera.damping, 0.0..=0.5));
    });
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading(t("settings.ui"));
    ui.horizontal(|ui| {
        ui.label(t("settings.font_size"));
        ui.add(
            egui::DragValue::new(&mut settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.horizontal(|ui| {
        ui.label(t("settings.default_environment"));
        let env = &mut settings.ui.default_environment;
        egui::ComboBox::from_id_salt("default_env_combo")
            .selected_text(env.display_name())
            .show_ui(ui, |ui| {
                for preset in EnvironmentPreset::all() {
                    ui.selectable_value(env, *preset, preset.display_name());
                }
            });
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, session: &mut Session) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button(t("settings.apply")).clicked() {
            session.apply_settings();
            session.settings.save();
        }
        if ui.button(t("settings.reset")).clicked() {
            session.settings = AppSettings::default();
            session.apply_settings();
        }
        if ui.button(t("settings.close")).clicked() {
            session.show_settings_window = false;
        }
    });
}
