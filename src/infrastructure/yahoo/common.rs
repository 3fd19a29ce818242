use crate::domain::errors::MarketDataError;
use crate::domain::financials::{FinancialStatement, LineItem, StatementKind, humanize_field};
use crate::domain::market::types::PriceBar;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

pub const PROVIDER: &str = "Yahoo Finance";

// ===== Chart (price history) =====

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
pub struct YahooError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl YahooError {
    fn message(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(desc)) => format!("{}: {}", code, desc),
            (None, Some(desc)) => desc.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    /// Exchange offset from UTC, seconds
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

fn decode_error(e: impl std::fmt::Display) -> MarketDataError {
    MarketDataError::Decode {
        provider: PROVIDER,
        reason: e.to_string(),
    }
}

fn at(values: &[Option<f64>], i: usize) -> Option<Decimal> {
    values.get(i).copied().flatten().and_then(Decimal::from_f64)
}

/// Decodes a `/v8/finance/chart` body. Rows with any null OHLCV field are skipped.
///
/// With `date_only`, timestamps are moved to midnight UTC of the exchange-local
/// trading date so daily and longer bars carry a plain date.
pub fn parse_chart(body: &str, date_only: bool) -> Result<Vec<PriceBar>, MarketDataError> {
    let response: ChartResponse = serde_json::from_str(body).map_err(decode_error)?;

    if let Some(err) = response.chart.error {
        return Err(MarketDataError::Provider {
            provider: PROVIDER,
            message: err.message(),
        });
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
            at(&quote.volume, i),
        ) else {
            continue;
        };

        let Some(timestamp) = bar_timestamp(*ts, result.meta.gmtoffset, date_only) else {
            continue;
        };

        bars.push(PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(bars)
}

fn bar_timestamp(ts: i64, gmtoffset: i64, date_only: bool) -> Option<DateTime<Utc>> {
    let instant = Utc.timestamp_opt(ts, 0).single()?;
    if !date_only {
        return Some(instant);
    }
    let local_date = Utc.timestamp_opt(ts + gmtoffset, 0).single()?.date_naive();
    Some(Utc.from_utc_datetime(&local_date.and_hms_opt(0, 0, 0)?))
}

// ===== Fundamentals timeseries (financial statements) =====

#[derive(Debug, Deserialize)]
pub struct TimeseriesResponse {
    pub timeseries: TimeseriesBody,
}

#[derive(Debug, Deserialize)]
pub struct TimeseriesBody {
    #[serde(default)]
    pub result: Option<Vec<serde_json::Value>>,
    pub error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeseriesPoint {
    as_of_date: String,
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: Option<f64>,
}

/// Prefix the fundamentals endpoint expects in front of every annual field
pub const ANNUAL_PREFIX: &str = "annual";

/// Comma-separated `type` parameter for a statement
pub fn timeseries_types(kind: StatementKind) -> String {
    kind.fields()
        .iter()
        .map(|f| format!("{}{}", ANNUAL_PREFIX, f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes a fundamentals timeseries body into one statement.
///
/// Each requested field becomes a line item and each `asOfDate` a period,
/// newest first. Fields with no reported values are left out.
pub fn parse_timeseries(
    body: &str,
    kind: StatementKind,
) -> Result<FinancialStatement, MarketDataError> {
    let response: TimeseriesResponse = serde_json::from_str(body).map_err(decode_error)?;

    if let Some(err) = response.timeseries.error {
        return Err(MarketDataError::Provider {
            provider: PROVIDER,
            message: err.message(),
        });
    }

    let results = response.timeseries.result.unwrap_or_default();
    let mut series: HashMap<&str, HashMap<NaiveDate, Decimal>> = HashMap::new();
    let mut periods: BTreeSet<NaiveDate> = BTreeSet::new();

    for &field in kind.fields() {
        let key = format!("{}{}", ANNUAL_PREFIX, field);
        let Some(points) = results.iter().find_map(|r| r.get(&key)) else {
            continue;
        };
        let points: Vec<Option<TimeseriesPoint>> =
            serde_json::from_value(points.clone()).map_err(decode_error)?;

        let mut values = HashMap::new();
        for point in points.into_iter().flatten() {
            let Ok(date) = NaiveDate::parse_from_str(&point.as_of_date, "%Y-%m-%d") else {
                continue;
            };
            if let Some(value) = point
                .reported_value
                .and_then(|v| v.raw)
                .and_then(Decimal::from_f64)
            {
                values.insert(date, value);
                periods.insert(date);
            }
        }
        if !values.is_empty() {
            series.insert(field, values);
        }
    }

    let periods: Vec<NaiveDate> = periods.into_iter().rev().collect();
    let items = kind
        .fields()
        .iter()
        .filter_map(|field| {
            let values = series.get(field)?;
            Some(LineItem {
                name: humanize_field(field),
                values: periods.iter().map(|p| values.get(p).copied()).collect(),
            })
        })
        .collect();

    Ok(FinancialStatement {
        kind,
        periods,
        items,
    })
}
