//! egui widgets for the configurator view. Drawing returns the actions the
//! user triggered this frame; nothing here touches the session.

use configurator::{ColorButton, ConfiguratorView, FailedAsset, UiAction, WheelButton};
use corelib::Color;
use egui::{Align2, Color32, RichText};

const SWATCH: egui::Vec2 = egui::vec2(36.0, 24.0);

pub fn draw(ctx: &egui::Context, view: &ConfiguratorView) -> Vec<UiAction> {
    let mut actions = Vec::new();
    match view {
        ConfiguratorView::Loading { failed } => {
            egui::Area::new(egui::Id::new("loading"))
                .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.heading("Loading…");
                });
            failures(ctx, failed, &mut actions);
        }
        ConfiguratorView::Ready(ready) => {
            egui::TopBottomPanel::bottom("selectors").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Wheels").strong());
                    for button in &ready.wheel_buttons {
                        wheel_button(ui, button, &mut actions);
                    }
                    ui.separator();
                    ui.label(RichText::new("Colour").strong());
                    for button in &ready.color_buttons {
                        color_button(ui, button, &mut actions);
                    }
                });
            });
            failures(ctx, &ready.failed, &mut actions);
        }
    }
    actions
}

fn wheel_button(ui: &mut egui::Ui, button: &WheelButton, actions: &mut Vec<UiAction>) {
    if ui
        .add_enabled(button.enabled, egui::Button::new(&button.id))
        .clicked()
    {
        actions.push(UiAction::SelectWheel(button.id.clone()));
    }
}

fn color_button(ui: &mut egui::Ui, button: &ColorButton, actions: &mut Vec<UiAction>) {
    let swatch = egui::Button::new("")
        .fill(color32(button.color))
        .min_size(SWATCH)
        .selected(!button.enabled);
    if ui
        .add_enabled(button.enabled, swatch)
        .on_hover_text(format!("{} {}", button.id, button.color))
        .clicked()
    {
        actions.push(UiAction::SelectColor(button.id.clone()));
    }
}

fn failures(ctx: &egui::Context, failed: &[FailedAsset], actions: &mut Vec<UiAction>) {
    if failed.is_empty() {
        return;
    }
    egui::Window::new("Failed to load")
        .anchor(Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0))
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            for asset in failed {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&asset.logical_name).strong())
                        .on_hover_text(&asset.reason);
                    if ui.button("Retry").clicked() {
                        actions.push(UiAction::Retry(asset.logical_name.clone()));
                    }
                });
            }
        });
}

fn color32(color: Color) -> Color32 {
    let hex = color.hex();
    Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}
