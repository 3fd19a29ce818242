use crate::domain::errors::MarketDataError;
use crate::domain::market::timespan::Timespan;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One OHLCV-sampled interval of trading data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PriceBar {
    /// Calendar date of the bar (UTC)
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Upper-cased stock symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(MarketDataError::InvalidRequest {
                reason: "ticker symbol is empty".to_string(),
            });
        }
        if symbol.contains(char::is_whitespace) || symbol.contains('/') {
            return Err(MarketDataError::InvalidRequest {
                reason: format!("'{}' is not a valid ticker symbol", symbol),
            });
        }
        Ok(Ticker(symbol))
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive calendar range, `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, MarketDataError> {
        if from > to {
            return Err(MarketDataError::InvalidRequest {
                reason: format!("start date {} is after end date {}", from, to),
            });
        }
        Ok(Self { from, to })
    }

    /// Parses two `YYYY-MM-DD` strings
    pub fn parse(from: &str, to: &str) -> Result<Self, MarketDataError> {
        let parse = |label: &str, value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
                MarketDataError::InvalidRequest {
                    reason: format!("{} date '{}' is not YYYY-MM-DD: {}", label, value.trim(), e),
                }
            })
        };
        Self::new(parse("start", from)?, parse("end", to)?)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Start of `from` as a unix timestamp (seconds, UTC)
    pub fn start_timestamp(&self) -> i64 {
        self.from.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp()
    }

    /// Start of `to` as a unix timestamp (seconds, UTC); the end date is exclusive
    /// for the free quote provider, matching how its history call treats `end`.
    pub fn end_timestamp(&self) -> i64 {
        self.to.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_to_{}", self.from, self.to)
    }
}

/// Everything a provider needs to return a price history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub ticker: Ticker,
    pub range: DateRange,
    pub multiplier: u32,
    pub timespan: Timespan,
}

impl HistoryRequest {
    pub fn new(
        ticker: Ticker,
        range: DateRange,
        multiplier: u32,
        timespan: Timespan,
    ) -> Result<Self, MarketDataError> {
        if multiplier == 0 {
            return Err(MarketDataError::InvalidRequest {
                reason: "multiplier must be at least 1".to_string(),
            });
        }
        Ok(Self {
            ticker,
            range,
            multiplier,
            timespan,
        })
    }

    /// Daily bars, as the gap analysis and comparison views use
    pub fn daily(ticker: Ticker, range: DateRange) -> Self {
        Self {
            ticker,
            range,
            multiplier: 1,
            timespan: Timespan::Day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_is_normalized() {
        let ticker: Ticker = "  aapl ".parse().unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
    }

    #[test]
    fn test_ticker_rejects_blank_and_paths() {
        assert!("   ".parse::<Ticker>().is_err());
        assert!("BTC/USD".parse::<Ticker>().is_err());
        assert!("BRK B".parse::<Ticker>().is_err());
    }

    #[test]
    fn test_date_range_order() {
        assert!(DateRange::parse("2024-01-01", "2024-09-30").is_ok());
        assert!(DateRange::parse("2024-09-30", "2024-01-01").is_err());
        assert!(DateRange::parse("2024-13-01", "2024-12-01").is_err());
    }

    #[test]
    fn test_date_range_display_matches_export_names() {
        let range = DateRange::parse("2014-01-01", "2024-01-01").unwrap();
        assert_eq!(range.to_string(), "2014-01-01_to_2024-01-01");
        assert_eq!(range.start_timestamp(), 1388534400);
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let range = DateRange::parse("2024-01-01", "2024-02-01").unwrap();
        let ticker: Ticker = "MSFT".parse().unwrap();
        assert!(HistoryRequest::new(ticker, range, 0, Timespan::Day).is_err());
    }
}
