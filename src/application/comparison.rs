use crate::application::gap_analysis::format_price;
use crate::domain::market::types::{PriceBar, Ticker};
use crate::domain::table::DataTable;
use rust_decimal::Decimal;

/// Extremes of one ticker's history over the compared range
#[derive(Debug, Clone, PartialEq)]
pub struct TickerExtremes {
    pub ticker: Ticker,
    pub highest_open: Decimal,
    pub lowest_close: Decimal,
}

impl TickerExtremes {
    /// `None` when `bars` is empty
    pub fn from_bars(ticker: Ticker, bars: &[PriceBar]) -> Option<Self> {
        let highest_open = bars.iter().map(|b| b.open).max()?;
        let lowest_close = bars.iter().map(|b| b.close).min()?;
        Some(Self {
            ticker,
            highest_open,
            lowest_close,
        })
    }
}

/// Side-by-side extremes of two tickers
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub first: TickerExtremes,
    pub second: TickerExtremes,
}

impl ComparisonSummary {
    pub fn to_table(&self) -> DataTable {
        let mut table = DataTable::new([
            "Metrics".to_string(),
            self.first.ticker.to_string(),
            self.second.ticker.to_string(),
        ]);
        table.push_row(vec![
            "Highest Open Value".to_string(),
            format_price(self.first.highest_open),
            format_price(self.second.highest_open),
        ]);
        table.push_row(vec![
            "Lowest Close Value".to_string(),
            format_price(self.first.lowest_close),
            format_price(self.second.lowest_close),
        ]);
        table
    }
}

/// Builds the summary; `None` unless both histories have bars.
pub fn compare(
    first: (&Ticker, &[PriceBar]),
    second: (&Ticker, &[PriceBar]),
) -> Option<ComparisonSummary> {
    Some(ComparisonSummary {
        first: TickerExtremes::from_bars(first.0.clone(), first.1)?,
        second: TickerExtremes::from_bars(second.0.clone(), second.1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(day: u32, open: Decimal, close: Decimal) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: dec!(10),
        }
    }

    #[test]
    fn test_compare_two_tickers() {
        let aapl: Ticker = "AAPL".parse().unwrap();
        let msft: Ticker = "MSFT".parse().unwrap();
        let aapl_bars = vec![bar(1, dec!(180), dec!(179.5)), bar(4, dec!(175.1), dec!(170.126))];
        let msft_bars = vec![bar(1, dec!(410), dec!(415)), bar(4, dec!(415.5), dec!(413))];

        let summary = compare((&aapl, aapl_bars.as_slice()), (&msft, msft_bars.as_slice())).unwrap();
        assert_eq!(summary.first.highest_open, dec!(180));
        assert_eq!(summary.second.lowest_close, dec!(413));

        let table = summary.to_table();
        assert_eq!(table.columns, vec!["Metrics", "AAPL", "MSFT"]);
        assert_eq!(table.rows[0], vec!["Highest Open Value", "180.00", "415.50"]);
        assert_eq!(table.rows[1], vec!["Lowest Close Value", "170.13", "413.00"]);
    }

    #[test]
    fn test_compare_needs_both_sides() {
        let aapl: Ticker = "AAPL".parse().unwrap();
        let msft: Ticker = "MSFT".parse().unwrap();
        let aapl_bars = vec![bar(1, dec!(180), dec!(181))];

        assert!(compare((&aapl, aapl_bars.as_slice()), (&msft, &[])).is_none());
    }
}
