//! Keyboard shortcut handling

use eframe::egui;

use super::Session;

#[derive(Default)]
struct Shortcuts {
    open: bool,
    clear: bool,
    wireframe: bool,
    clipping: bool,
    highlight: bool,
    reset_camera: bool,
}

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, session: &mut Session) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let keys = ctx.input(|i| Shortcuts {
        // Ctrl+O: open model
        open: i.modifiers.command && i.key_pressed(egui::Key::O),
        // Delete: clear model
        clear: i.key_pressed(egui::Key::Delete),
        wireframe: !i.modifiers.command && i.key_pressed(egui::Key::W),
        clipping: !i.modifiers.command && i.key_pressed(egui::Key::C),
        highlight: !i.modifiers.command && i.key_pressed(egui::Key::H),
        reset_camera: !i.modifiers.command && i.key_pressed(egui::Key::R),
    });

    // The file dialog blocks, so it must run outside the input closure
    if keys.open {
        session.open_dialog();
    }

    let viewer = &mut session.viewer;
    let controls = viewer.controls();
    if keys.clear && viewer.has_model() {
        viewer.clear_model();
    }
    if keys.wireframe && viewer.has_model() {
        viewer.set_wireframe(!controls.wireframe);
    }
    if keys.clipping {
        viewer.set_clip_enabled(!controls.clip_enabled);
    }
    if keys.highlight {
        viewer.set_highlight_enabled(!controls.highlight_enabled);
    }
    if keys.reset_camera {
        viewer.reset_camera();
    }
}
