use crate::domain::errors::SessionError;
use crate::interfaces::components::card::Card;
use crate::interfaces::components::metrics::{render_error, render_status_pill};
use crate::interfaces::design_system::DesignSystem;
use eframe::egui;

/// What the user asked for on the home page this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAction {
    LaunchYahoo,
    /// Key to validate before entering the Polygon dashboard
    ValidateKey(String),
}

#[derive(Debug, Default)]
pub struct HomeState {
    pub api_key_input: String,
    pub show_key_input: bool,
    pub validating: bool,
    pub error: Option<String>,
}

impl HomeState {
    /// Prefills the key field from configuration
    pub fn with_api_key(api_key: &str) -> Self {
        Self {
            api_key_input: api_key.to_string(),
            ..Self::default()
        }
    }

    fn submit_key(&mut self) -> Option<HomeAction> {
        let key = self.api_key_input.trim();
        if key.is_empty() {
            self.error = Some(SessionError::MissingApiKey.to_string());
            return None;
        }
        self.error = None;
        self.validating = true;
        Some(HomeAction::ValidateKey(key.to_string()))
    }
}

pub fn render_home(state: &mut HomeState, ui: &mut egui::Ui) -> Option<HomeAction> {
    let mut action = None;

    ui.vertical_centered(|ui| {
        ui.add_space(DesignSystem::SPACING_LARGE * 2.0);
        ui.label(
            egui::RichText::new("📈 Stock Dashboard")
                .size(32.0)
                .strong()
                .color(DesignSystem::TEXT_PRIMARY),
        );
        ui.label(
            egui::RichText::new("Price history, financial statements and weekly gap analysis")
                .color(DesignSystem::TEXT_SECONDARY),
        );
        ui.add_space(DesignSystem::SPACING_LARGE);

        ui.set_max_width(480.0);

        Card::new()
            .title("Yahoo Finance")
            .subtitle("Free daily history and annual statements")
            .show(ui, |ui| {
                if ui.button("Continue with Yahoo Finance").clicked() {
                    action = Some(HomeAction::LaunchYahoo);
                }
            });

        ui.add_space(DesignSystem::SPACING_MEDIUM);

        Card::new()
            .title("Polygon Premium Insights")
            .subtitle("Intraday aggregates, requires an API key")
            .show(ui, |ui| {
                if !state.show_key_input {
                    if ui.button("Continue with Polygon Premium Insights").clicked() {
                        state.show_key_input = true;
                    }
                    return;
                }

                ui.horizontal(|ui| {
                    ui.label("API key");
                    let response = ui.add_enabled(
                        !state.validating,
                        egui::TextEdit::singleline(&mut state.api_key_input)
                            .password(true)
                            .hint_text("Polygon API key")
                            .desired_width(260.0),
                    );
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    if (ui
                        .add_enabled(!state.validating, egui::Button::new("Submit"))
                        .clicked()
                        || submitted)
                        && let Some(a) = state.submit_key()
                    {
                        action = Some(a);
                    }
                });

                if state.validating {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        render_status_pill(ui, "Validating API key...", DesignSystem::WARNING);
                    });
                }
                render_error(ui, state.error.as_deref());
            });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_rejected_locally() {
        let mut state = HomeState::with_api_key("   ");
        assert_eq!(state.submit_key(), None);
        assert_eq!(
            state.error.as_deref(),
            Some("Please enter your Polygon API key to continue.")
        );
        assert!(!state.validating);
    }

    #[test]
    fn test_key_submission_starts_validation() {
        let mut state = HomeState::with_api_key(" pk_123 ");
        assert_eq!(
            state.submit_key(),
            Some(HomeAction::ValidateKey("pk_123".to_string()))
        );
        assert!(state.validating);
    }
}
