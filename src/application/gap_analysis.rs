//! Weekly gap analysis
//!
//! Folds daily bars into calendar weeks and derives, for each week, the gap
//! between a later week's close and this week's open, expressed as a
//! percentage of another week's open. Weeks whose lead rows fall past the end
//! of the range carry no gap.

use crate::domain::market::types::PriceBar;
use crate::domain::market::weekly::{GapKpi, WeekPeriod, WeeklyAggregate, round2};
use crate::domain::table::DataTable;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Shown in place of every gap view when the fetch returned no bars
pub const NO_DATA_MESSAGE: &str = "No data available for the selected ticker and date range.";

/// Row offsets of the gap formula.
///
/// `gap[i] = close[i + close_lead] - open[i]` and
/// `gap_percent[i] = gap[i] / open[i + base_lead] * 100`.
///
/// The defaults (2 and 1) compare a week's open with the close two weeks
/// later, which looks like an artifact of the dashboard this analysis came
/// from rather than a deliberate choice. Set both to 0 for a same-week gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapOffsets {
    pub close_lead: usize,
    pub base_lead: usize,
}

impl Default for GapOffsets {
    fn default() -> Self {
        Self {
            close_lead: 2,
            base_lead: 1,
        }
    }
}

/// Close-to-close move of one bar
#[derive(Debug, Clone, PartialEq)]
pub struct DailyGap {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub close: Decimal,
    pub gap: Decimal,
}

/// Week with the largest gap percentage
#[derive(Debug, Clone, PartialEq)]
pub struct GapSummary {
    /// 1-based position of the week in the weekly table
    pub week_number: usize,
    pub week: WeeklyAggregate,
}

impl GapSummary {
    pub fn to_table(&self) -> DataTable {
        let w = &self.week;
        let mut table = DataTable::new(["Metrics", "Value"]);
        let rows = [
            ("Week Number", format!("Week {}", self.week_number)),
            ("Highest in Week", format_price(w.highest_in_week)),
            ("Lowest in Week", format_price(w.lowest_in_week)),
            ("Opening in Week", format_price(w.opening_week)),
            ("Closing in Week", format_price(w.closing_week)),
            ("Volume", format_thousands(w.volume_sum)),
            ("Highest Gap %", GapKpi::label(w.gap_percent)),
        ];
        for (metric, value) in rows {
            table.push_row(vec![metric.to_string(), value]);
        }
        table
    }
}

/// Everything the gap view renders for one ticker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapAnalysis {
    pub weeks: Vec<WeeklyAggregate>,
    pub daily: Vec<DailyGap>,
    pub summary: Option<GapSummary>,
}

impl GapAnalysis {
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Groups bars by calendar week (Monday start), oldest week first.
///
/// Bars inside a week are folded in input order, so the first bar seen
/// provides the week's open and the last one its close.
pub fn aggregate_weekly(bars: &[PriceBar]) -> Vec<WeeklyAggregate> {
    let mut buckets: BTreeMap<WeekPeriod, WeeklyAggregate> = BTreeMap::new();

    for bar in bars {
        let period = WeekPeriod::containing(bar.date());
        buckets
            .entry(period)
            .and_modify(|week| week.update(bar))
            .or_insert_with(|| WeeklyAggregate::new(bar));
    }

    buckets.into_values().collect()
}

/// Fills `gap` and `gap_percent` on each week according to `offsets`.
pub fn apply_gaps(weeks: &mut [WeeklyAggregate], offsets: GapOffsets) {
    let closes: Vec<Decimal> = weeks.iter().map(|w| w.closing_week).collect();
    let opens: Vec<Decimal> = weeks.iter().map(|w| w.opening_week).collect();

    for (i, week) in weeks.iter_mut().enumerate() {
        let gap = closes.get(i + offsets.close_lead).map(|close| *close - opens[i]);
        let base = opens.get(i + offsets.base_lead).copied();

        week.gap = gap;
        week.gap_percent = match (gap, base) {
            (Some(gap), Some(base)) if !base.is_zero() => gap
                .checked_div(base)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
            _ => None,
        };
    }
}

/// Picks the week with the highest gap percentage; ties go to the earliest week.
pub fn summarize(weeks: &[WeeklyAggregate]) -> Option<GapSummary> {
    let mut best: Option<(usize, Decimal)> = None;

    for (i, week) in weeks.iter().enumerate() {
        let Some(pct) = week.gap_percent else {
            continue;
        };
        if best.is_none_or(|(_, top)| pct > top) {
            best = Some((i, pct));
        }
    }

    best.map(|(i, _)| GapSummary {
        week_number: i + 1,
        week: weeks[i].clone(),
    })
}

/// Close minus previous close for every bar after the first
pub fn daily_gaps(bars: &[PriceBar]) -> Vec<DailyGap> {
    bars.windows(2)
        .map(|pair| DailyGap {
            timestamp: pair[1].timestamp,
            open: pair[1].open,
            close: pair[1].close,
            gap: pair[1].close - pair[0].close,
        })
        .collect()
}

/// Runs the full transform. Empty input yields an empty analysis.
pub fn analyze(bars: &[PriceBar], offsets: GapOffsets) -> GapAnalysis {
    if bars.is_empty() {
        warn!("Gap analysis: no bars to aggregate");
        return GapAnalysis::default();
    }

    let mut weeks = aggregate_weekly(bars);
    apply_gaps(&mut weeks, offsets);
    let summary = summarize(&weeks);

    debug!(
        "Gap analysis: {} bars -> {} weeks, summary week {:?}",
        bars.len(),
        weeks.len(),
        summary.as_ref().map(|s| s.week_number)
    );

    GapAnalysis {
        weeks,
        daily: daily_gaps(bars),
        summary,
    }
}

pub fn format_price(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Integer part grouped by thousands: `1234567.8` -> `"1,234,568"`
pub fn format_thousands(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
