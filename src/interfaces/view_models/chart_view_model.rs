use crate::application::gap_analysis::DailyGap;
use crate::domain::market::types::PriceBar;
use crate::domain::market::weekly::{GapKpi, WeeklyAggregate};
use crate::interfaces::components::charts::Series;
use crate::interfaces::design_system::DesignSystem;
use eframe::egui;
use rust_decimal::prelude::ToPrimitive;

/// Points per line; longer histories are thinned evenly
const MAX_POINTS: usize = 5_000;

/// Maps dashboard data onto plot series and cell colors
pub struct ChartViewModel;

impl ChartViewModel {
    pub fn close_series(name: &str, bars: &[PriceBar], color: egui::Color32) -> Series {
        let every = bars.len().div_ceil(MAX_POINTS).max(1);
        Series {
            name: name.to_string(),
            points: bars
                .iter()
                .step_by(every)
                .map(|b| [b.timestamp.timestamp() as f64, b.close.to_f64().unwrap_or(0.0)])
                .collect(),
            color,
        }
    }

    /// Daily open and close lines of the gap view
    pub fn daily_gap_series(daily: &[DailyGap]) -> Vec<Series> {
        let point = |d: &DailyGap, v: rust_decimal::Decimal| {
            [d.timestamp.timestamp() as f64, v.to_f64().unwrap_or(0.0)]
        };
        vec![
            Series {
                name: "Open".to_string(),
                points: daily.iter().map(|d| point(d, d.open)).collect(),
                color: DesignSystem::ACCENT_PRIMARY,
            },
            Series {
                name: "Close".to_string(),
                points: daily.iter().map(|d| point(d, d.close)).collect(),
                color: DesignSystem::ACCENT_SECONDARY,
            },
        ]
    }

    /// Color for the KPI column of the weekly gap table, `None` elsewhere
    pub fn weekly_cell_color(
        weeks: &[WeeklyAggregate],
        kpi_column: Option<usize>,
        row: usize,
        column: usize,
    ) -> Option<egui::Color32> {
        if Some(column) != kpi_column {
            return None;
        }
        weeks.get(row).map(|w| DesignSystem::kpi_color(w.kpi()))
    }

    pub fn kpi_legend() -> [(GapKpi, &'static str); 3] {
        [
            (GapKpi::Up, "gap up"),
            (GapKpi::Down, "gap down"),
            (GapKpi::Neutral, "flat or unavailable"),
        ]
    }
}
