use crate::interfaces::design_system::DesignSystem;
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

/// One named line of a time chart, x in unix seconds
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub color: egui::Color32,
}

/// Line chart with a date-formatted x axis
pub fn render_line_chart(ui: &mut egui::Ui, id: &str, series: Vec<Series>) {
    if series.iter().all(|s| s.points.is_empty()) {
        ui.label(
            egui::RichText::new("Nothing to plot.")
                .italics()
                .color(DesignSystem::TEXT_MUTED),
        );
        return;
    }

    Plot::new(id.to_string())
        .height(DesignSystem::CHART_HEIGHT)
        .legend(Legend::default())
        .show_grid([true, true])
        .x_axis_formatter(|mark, _range| {
            chrono::DateTime::from_timestamp(mark.value as i64, 0)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(|name, value| {
            let date = chrono::DateTime::from_timestamp(value.x as i64, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            if name.is_empty() {
                format!("{}\n{:.2}", date, value.y)
            } else {
                format!("{}\n{}\n{:.2}", name, date, value.y)
            }
        })
        .show(ui, |plot_ui| {
            for s in series {
                plot_ui.line(
                    Line::new(s.name, PlotPoints::from(s.points))
                        .color(s.color)
                        .width(1.5),
                );
            }
        });
}
