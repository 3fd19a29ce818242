//! Table builders shared by the dashboard, the CLI and the exporter.

use crate::application::gap_analysis::{DailyGap, format_price};
use crate::domain::financials::FinancialStatement;
use crate::domain::market::timespan::Timespan;
use crate::domain::market::types::PriceBar;
use crate::domain::market::weekly::{GapKpi, WeeklyAggregate};
use crate::domain::table::DataTable;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub const PRICE_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

pub const WEEKLY_GAP_COLUMNS: [&str; 8] = [
    "Week Number",
    "Week Range",
    "Gap % with KPI",
    "Highest_in_week",
    "Lowest_in_week",
    "Opening_week",
    "Closing_week",
    "Volume",
];

pub const DAILY_GAP_COLUMNS: [&str; 4] = ["Date", "Open", "Close", "Gap"];

/// How prices are written into a price history table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Two decimals, for on-screen tables
    Display,
    /// Provider values as received, for spreadsheets
    Full,
}

impl Precision {
    fn price(self, value: Decimal) -> String {
        match self {
            Precision::Display => format_price(value),
            Precision::Full => value.normalize().to_string(),
        }
    }
}

/// Date only for daily and longer bars, date and time for intraday ones.
///
/// The format follows the bar unit, not the clock value, so an intraday bar
/// stamped at midnight UTC still shows its time.
pub fn format_timestamp(ts: DateTime<Utc>, intraday: bool) -> String {
    if intraday {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

fn format_volume(volume: Decimal) -> String {
    volume.normalize().to_string()
}

pub fn price_history_table(bars: &[PriceBar], timespan: Timespan, precision: Precision) -> DataTable {
    let intraday = timespan.is_intraday();
    let mut table = DataTable::new(PRICE_COLUMNS);
    for bar in bars {
        table.push_row(vec![
            format_timestamp(bar.timestamp, intraday),
            precision.price(bar.open),
            precision.price(bar.high),
            precision.price(bar.low),
            precision.price(bar.close),
            format_volume(bar.volume),
        ]);
    }
    table
}

pub fn weekly_gap_table(weeks: &[WeeklyAggregate]) -> DataTable {
    let mut table = DataTable::new(WEEKLY_GAP_COLUMNS);
    for (i, week) in weeks.iter().enumerate() {
        table.push_row(vec![
            format!("Week {}", i + 1),
            week.week.range_label(),
            GapKpi::label(week.gap_percent),
            format_price(week.highest_in_week),
            format_price(week.lowest_in_week),
            format_price(week.opening_week),
            format_price(week.closing_week),
            format_volume(week.volume_sum),
        ]);
    }
    table
}

pub fn daily_gap_table(daily: &[DailyGap]) -> DataTable {
    let mut table = DataTable::new(DAILY_GAP_COLUMNS);
    for row in daily {
        table.push_row(vec![
            format_timestamp(row.timestamp, false),
            format_price(row.open),
            format_price(row.close),
            format_price(row.gap),
        ]);
    }
    table
}

/// Line items as rows, one column per period (newest first)
pub fn statement_table(statement: &FinancialStatement) -> DataTable {
    let mut columns = vec![String::new()];
    columns.extend(statement.periods.iter().map(|p| p.to_string()));

    let mut table = DataTable::new(columns);
    for item in &statement.items {
        let mut row = vec![item.name.clone()];
        row.extend(
            item.values
                .iter()
                .map(|v| v.map(|d| d.normalize().to_string()).unwrap_or_default()),
        );
        table.push_row(row);
    }
    table
}
