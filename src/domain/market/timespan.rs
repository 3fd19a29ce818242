use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregate bar unit, as accepted by the premium aggregates endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timespan {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Timespan {
    /// All units in the order the input widgets list them
    pub const ALL: [Timespan; 8] = [
        Timespan::Second,
        Timespan::Minute,
        Timespan::Hour,
        Timespan::Day,
        Timespan::Week,
        Timespan::Month,
        Timespan::Quarter,
        Timespan::Year,
    ];

    /// Path segment for Polygon `/v2/aggs/.../range/{multiplier}/{timespan}/...`
    pub fn to_polygon_string(&self) -> &'static str {
        match self {
            Timespan::Second => "second",
            Timespan::Minute => "minute",
            Timespan::Hour => "hour",
            Timespan::Day => "day",
            Timespan::Week => "week",
            Timespan::Month => "month",
            Timespan::Quarter => "quarter",
            Timespan::Year => "year",
        }
    }

    /// Converts to a Yahoo chart `interval` value.
    ///
    /// Yahoo has no second or yearly bars; both fall back to daily.
    pub fn to_yahoo_interval(&self) -> &'static str {
        match self {
            Timespan::Minute => "1m",
            Timespan::Hour => "1h",
            Timespan::Week => "1wk",
            Timespan::Month => "1mo",
            Timespan::Quarter => "3mo",
            Timespan::Second | Timespan::Day | Timespan::Year => "1d",
        }
    }

    /// True for units shorter than a trading day
    pub fn is_intraday(&self) -> bool {
        matches!(self, Timespan::Second | Timespan::Minute | Timespan::Hour)
    }
}

impl FromStr for Timespan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sec" | "second" => Ok(Timespan::Second),
            "m" | "min" | "minute" => Ok(Timespan::Minute),
            "h" | "hr" | "hour" => Ok(Timespan::Hour),
            "d" | "day" => Ok(Timespan::Day),
            "w" | "wk" | "week" => Ok(Timespan::Week),
            "mo" | "month" => Ok(Timespan::Month),
            "q" | "quarter" => Ok(Timespan::Quarter),
            "y" | "year" => Ok(Timespan::Year),
            _ => Err(anyhow!(
                "Invalid timespan: '{}'. Valid options: second, minute, hour, day, week, month, quarter, year",
                s
            )),
        }
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_polygon_string())
    }
}
