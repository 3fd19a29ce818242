use crate::domain::market::types::PriceBar;
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar week, identified by its Monday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekPeriod {
    monday: NaiveDate,
}

impl WeekPeriod {
    /// The week (Monday through Sunday) that contains `date`
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            monday: date - Duration::days(offset),
        }
    }

    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// Last trading day of the week
    pub fn friday(&self) -> NaiveDate {
        self.monday + Duration::days(4)
    }

    /// ISO (year, week number)
    pub fn iso_week(&self) -> (i32, u32) {
        let week = self.monday.iso_week();
        (week.year(), week.week())
    }

    /// `"YYYY-MM-DD - YYYY-MM-DD"`, Monday through Friday
    pub fn range_label(&self) -> String {
        format!("{} - {}", self.monday, self.friday())
    }
}

impl fmt::Display for WeekPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, week) = self.iso_week();
        write!(f, "{}-W{:02}", year, week)
    }
}

/// Sign marker shown next to a gap percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapKpi {
    Up,
    Down,
    Neutral,
}

impl GapKpi {
    pub fn from_gap_percent(gap_percent: Option<Decimal>) -> Self {
        match gap_percent {
            Some(p) if p > Decimal::ZERO => GapKpi::Up,
            Some(p) if p < Decimal::ZERO => GapKpi::Down,
            _ => GapKpi::Neutral,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            GapKpi::Up => "▲",
            GapKpi::Down => "🔻",
            GapKpi::Neutral => "➖",
        }
    }

    /// `"▲ 3.25%"`; a missing percentage renders as `"➖ n/a"`
    pub fn label(gap_percent: Option<Decimal>) -> String {
        let kpi = Self::from_gap_percent(gap_percent);
        match gap_percent {
            Some(p) => format!("{} {:.2}%", kpi.symbol(), round2(p)),
            None => format!("{} n/a", kpi.symbol()),
        }
    }
}

/// Rounds half away from zero to two decimals, as the tables display prices
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// One week of bars folded into a single OHLCV row, plus the derived gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    pub week: WeekPeriod,
    pub highest_in_week: Decimal,
    pub lowest_in_week: Decimal,
    pub opening_week: Decimal,
    pub closing_week: Decimal,
    pub volume_sum: Decimal,
    /// Number of bars folded into this week
    pub bar_count: usize,
    pub gap: Option<Decimal>,
    pub gap_percent: Option<Decimal>,
}

impl WeeklyAggregate {
    /// Starts a week from its first bar
    pub fn new(bar: &PriceBar) -> Self {
        Self {
            week: WeekPeriod::containing(bar.date()),
            highest_in_week: bar.high,
            lowest_in_week: bar.low,
            opening_week: bar.open,
            closing_week: bar.close,
            volume_sum: bar.volume,
            bar_count: 1,
            gap: None,
            gap_percent: None,
        }
    }

    /// Folds a later bar of the same week in.
    ///
    /// Open stays the first bar's open, close becomes the latest close.
    pub fn update(&mut self, bar: &PriceBar) {
        if bar.high > self.highest_in_week {
            self.highest_in_week = bar.high;
        }
        if bar.low < self.lowest_in_week {
            self.lowest_in_week = bar.low;
        }
        self.closing_week = bar.close;
        self.volume_sum += bar.volume;
        self.bar_count += 1;
    }

    pub fn kpi(&self) -> GapKpi {
        GapKpi::from_gap_percent(self.gap_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(day: u32, open: Decimal, close: Decimal) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 14, 30, 0).unwrap(),
            open,
            high: open.max(close) + dec!(1),
            low: open.min(close) - dec!(1),
            close,
            volume: dec!(1000),
        }
    }

    #[test]
    fn test_week_containing_any_weekday_starts_on_monday() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        assert_eq!(WeekPeriod::containing(wednesday).monday(), monday);
        assert_eq!(WeekPeriod::containing(sunday).monday(), monday);
        assert_eq!(
            WeekPeriod::containing(monday).range_label(),
            "2024-01-01 - 2024-01-05"
        );
        assert_eq!(WeekPeriod::containing(monday).to_string(), "2024-W01");
    }

    #[test]
    fn test_update_folds_bars() {
        let mut week = WeeklyAggregate::new(&bar(1, dec!(100), dec!(101)));
        week.update(&bar(2, dec!(101), dec!(99)));
        week.update(&bar(3, dec!(99), dec!(104)));

        assert_eq!(week.opening_week, dec!(100));
        assert_eq!(week.closing_week, dec!(104));
        assert_eq!(week.highest_in_week, dec!(105));
        assert_eq!(week.lowest_in_week, dec!(98));
        assert_eq!(week.volume_sum, dec!(3000));
        assert_eq!(week.bar_count, 3);
    }

    #[test]
    fn test_kpi_labels() {
        assert_eq!(GapKpi::label(Some(dec!(3.254))), "▲ 3.25%");
        assert_eq!(GapKpi::label(Some(dec!(-0.005))), "🔻 -0.01%");
        assert_eq!(GapKpi::label(Some(Decimal::ZERO)), "➖ 0.00%");
        assert_eq!(GapKpi::label(None), "➖ n/a");
    }
}
