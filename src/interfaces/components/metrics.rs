use crate::interfaces::design_system::DesignSystem;
use eframe::egui;

/// Rounded pill, used for status and error banners
pub fn render_status_pill(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    egui::Frame::NONE
        .fill(color.linear_multiply(0.15))
        .corner_radius(12)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).size(12.0).strong().color(color));
        });
}

/// Error pill when `error` is set. Returns whether one was drawn.
pub fn render_error(ui: &mut egui::Ui, error: Option<&str>) -> bool {
    match error {
        Some(message) => {
            render_status_pill(ui, message, DesignSystem::DANGER);
            true
        }
        None => false,
    }
}

/// Headline number with a caption underneath
pub fn render_metric(ui: &mut egui::Ui, caption: &str, value: &str, color: egui::Color32) {
    ui.vertical(|ui| {
        ui.label(
            egui::RichText::new(caption)
                .size(11.0)
                .color(DesignSystem::TEXT_MUTED),
        );
        ui.label(egui::RichText::new(value).size(22.0).strong().color(color));
    });
}
