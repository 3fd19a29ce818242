use crate::domain::market::weekly::GapKpi;
use eframe::egui;

/// Dark dashboard palette and spacing
pub struct DesignSystem;

impl DesignSystem {
    pub const BG_WINDOW: egui::Color32 = egui::Color32::from_rgb(10, 12, 16);
    pub const BG_SIDEBAR: egui::Color32 = egui::Color32::from_rgb(14, 17, 23);
    pub const BG_CARD: egui::Color32 = egui::Color32::from_rgb(22, 27, 34);
    pub const BG_CARD_HOVER: egui::Color32 = egui::Color32::from_rgb(28, 33, 40);
    pub const BG_INPUT: egui::Color32 = egui::Color32::from_rgb(15, 18, 24);

    pub const ACCENT_PRIMARY: egui::Color32 = egui::Color32::from_rgb(41, 121, 255);
    pub const ACCENT_SECONDARY: egui::Color32 = egui::Color32::from_rgb(255, 145, 0);

    pub const SUCCESS: egui::Color32 = egui::Color32::from_rgb(0, 230, 118);
    pub const DANGER: egui::Color32 = egui::Color32::from_rgb(255, 23, 68);
    pub const WARNING: egui::Color32 = egui::Color32::from_rgb(255, 193, 7);

    pub const TEXT_PRIMARY: egui::Color32 = egui::Color32::from_rgb(240, 246, 252);
    pub const TEXT_SECONDARY: egui::Color32 = egui::Color32::from_gray(160);
    pub const TEXT_MUTED: egui::Color32 = egui::Color32::from_gray(100);

    pub const BORDER_SUBTLE: egui::Color32 = egui::Color32::from_rgb(48, 54, 61);

    pub const ROUNDING_MEDIUM: f32 = 8.0;

    pub const SPACING_SMALL: f32 = 8.0;
    pub const SPACING_MEDIUM: f32 = 16.0;
    pub const SPACING_LARGE: f32 = 24.0;

    pub const SIDEBAR_WIDTH: f32 = 260.0;
    pub const CHART_HEIGHT: f32 = 280.0;

    pub fn theme() -> egui::Visuals {
        let mut visuals = egui::Visuals::dark();

        visuals.window_fill = Self::BG_WINDOW;
        visuals.panel_fill = Self::BG_WINDOW;
        visuals.extreme_bg_color = Self::BG_INPUT;

        visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, Self::BORDER_SUBTLE);
        visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, Self::TEXT_PRIMARY);
        visuals.widgets.inactive.weak_bg_fill = Self::BG_CARD;
        visuals.widgets.inactive.bg_fill = Self::BG_CARD;
        visuals.widgets.hovered.bg_fill = Self::BG_CARD_HOVER;

        visuals.selection.bg_fill = Self::ACCENT_PRIMARY.linear_multiply(0.3);
        visuals.selection.stroke = egui::Stroke::new(1.0, Self::ACCENT_PRIMARY);

        visuals
    }

    pub fn card_frame() -> egui::Frame {
        egui::Frame::NONE
            .fill(Self::BG_CARD)
            .corner_radius(Self::ROUNDING_MEDIUM)
            .stroke(egui::Stroke::new(1.0, Self::BORDER_SUBTLE))
            .inner_margin(Self::SPACING_MEDIUM as i8)
    }

    pub fn main_frame() -> egui::Frame {
        egui::Frame::NONE
            .fill(Self::BG_WINDOW)
            .inner_margin(egui::Margin::same(Self::SPACING_LARGE as i8))
    }

    pub fn sidebar_frame() -> egui::Frame {
        egui::Frame::NONE
            .fill(Self::BG_SIDEBAR)
            .inner_margin(egui::Margin::same(Self::SPACING_MEDIUM as i8))
    }

    /// Text color of a weekly gap marker
    pub fn kpi_color(kpi: GapKpi) -> egui::Color32 {
        match kpi {
            GapKpi::Up => Self::SUCCESS,
            GapKpi::Down => Self::DANGER,
            GapKpi::Neutral => Self::TEXT_SECONDARY,
        }
    }
}
