use crate::domain::errors::MarketDataError;
use crate::domain::financials::{FinancialStatement, LineItem, StatementKind, humanize_field};
use crate::domain::market::timespan::Timespan;
use crate::domain::market::types::{HistoryRequest, PriceBar, Ticker};
use crate::domain::ports::{ApiKeyValidator, FinancialsProvider, PriceHistoryProvider};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use rust_decimal::Decimal;
use tracing::info;

const PROVIDER: &str = "Mock";

/// Cap on generated bars so a decade of minute bars stays cheap
const MAX_BARS: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Behavior {
    Synthetic,
    Empty,
    Failing(String),
}

/// Offline provider producing deterministic synthetic data.
///
/// The same ticker and range always give the same bars, so dashboards and
/// tests are reproducible without network access.
#[derive(Debug, Clone)]
pub struct MockMarketDataService {
    behavior: Behavior,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Synthetic,
        }
    }

    /// Every call succeeds with no data
    pub fn empty() -> Self {
        Self {
            behavior: Behavior::Empty,
        }
    }

    /// Every call fails with a provider error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Failing(message.into()),
        }
    }

    fn check(&self) -> Result<bool, MarketDataError> {
        match &self.behavior {
            Behavior::Synthetic => Ok(true),
            Behavior::Empty => Ok(false),
            Behavior::Failing(message) => Err(MarketDataError::Provider {
                provider: PROVIDER,
                message: message.clone(),
            }
            .classify_key_rejection()),
        }
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

/// Small stable number derived from the ticker letters
fn seed(ticker: &Ticker) -> u32 {
    ticker
        .as_str()
        .bytes()
        .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Bar start instants for the request, regular trading hours only for intraday units
fn bar_times(request: &HistoryRequest) -> Vec<DateTime<Utc>> {
    let step = request.multiplier.max(1) as i64;
    let mut times = Vec::new();
    let mut day = request.range.from();

    while day <= request.range.to() && times.len() < MAX_BARS {
        if is_business_day(day) {
            let midnight = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default());
            let session_open = midnight + Duration::minutes(14 * 60 + 30);
            let session_minutes: i64 = 390;
            let intraday_step = match request.timespan {
                Timespan::Second => Some(Duration::seconds(step)),
                Timespan::Minute => Some(Duration::minutes(step)),
                Timespan::Hour => Some(Duration::hours(step)),
                _ => None,
            };

            match intraday_step {
                Some(every) => {
                    let close = session_open + Duration::minutes(session_minutes);
                    let mut t = session_open;
                    while t < close && times.len() < MAX_BARS {
                        times.push(t);
                        t += every;
                    }
                }
                None => times.push(midnight),
            }
        }
        day += Duration::days(1);
    }

    match request.timespan {
        Timespan::Week | Timespan::Month | Timespan::Quarter | Timespan::Year => {
            downsample(times, request.timespan, step as u32)
        }
        _ => times,
    }
}

/// Keeps the first trading day of every `step`-th week/month/quarter/year
fn downsample(days: Vec<DateTime<Utc>>, timespan: Timespan, step: u32) -> Vec<DateTime<Utc>> {
    let bucket = |t: &DateTime<Utc>| -> i64 {
        let d = t.date_naive();
        match timespan {
            Timespan::Week => (d.num_days_from_ce() as i64 - 1) / 7,
            Timespan::Month => d.year() as i64 * 12 + d.month0() as i64,
            Timespan::Quarter => d.year() as i64 * 4 + (d.month0() / 3) as i64,
            _ => d.year() as i64,
        }
    };

    let mut out = Vec::new();
    let mut last: Option<i64> = None;
    for t in days {
        let b = bucket(&t) / step.max(1) as i64;
        if last != Some(b) {
            out.push(t);
            last = Some(b);
        }
    }
    out
}

/// Deterministic OHLCV series: a slow drift plus a repeating zig-zag
fn synthesize(ticker: &Ticker, times: &[DateTime<Utc>]) -> Vec<PriceBar> {
    let s = seed(ticker);
    let base = Decimal::from(50 + s % 400);

    times
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let i = i as u32;
            let swing = Decimal::from((i.wrapping_mul(7).wrapping_add(s)) % 23) - Decimal::from(11);
            let drift = Decimal::new(i as i64 * 5, 2);
            let open = base + drift + swing / Decimal::from(4);
            let close = open + Decimal::from(i.wrapping_add(s) % 9) / Decimal::from(4) - Decimal::ONE;
            let high = open.max(close) + Decimal::new(75, 2);
            let low = (open.min(close) - Decimal::new(80, 2)).max(Decimal::ONE);

            PriceBar {
                timestamp: *t,
                open,
                high,
                low,
                close,
                volume: Decimal::from(1_000_000 + (s % 1000) * 1000 + (i % 37) * 25_000),
            }
        })
        .collect()
}

#[async_trait]
impl PriceHistoryProvider for MockMarketDataService {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_price_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        if !self.check()? {
            return Ok(Vec::new());
        }

        let bars = synthesize(&request.ticker, &bar_times(request));
        info!(
            "MockMarketDataService: Generated {} {} bars for {}",
            bars.len(),
            request.timespan,
            request.ticker
        );
        Ok(bars)
    }
}

#[async_trait]
impl FinancialsProvider for MockMarketDataService {
    async fn get_financial_statement(
        &self,
        ticker: &Ticker,
        kind: StatementKind,
    ) -> Result<FinancialStatement, MarketDataError> {
        if !self.check()? {
            return Ok(FinancialStatement::empty(kind));
        }

        let s = seed(ticker) as i64;
        let periods: Vec<NaiveDate> = (0..4)
            .filter_map(|back| NaiveDate::from_ymd_opt(2023 - back, 9, 30))
            .collect();

        let items = kind
            .fields()
            .iter()
            .enumerate()
            .map(|(row, field)| {
                let row = row as i64;
                let values = (0..periods.len() as i64)
                    .map(|col| {
                        let millions = 1_000 + (s % 500) * 10 + row * 250 - col * 40;
                        Some(Decimal::from(millions) * Decimal::from(1_000_000))
                    })
                    .collect();
                LineItem {
                    name: humanize_field(field),
                    values,
                }
            })
            .collect();

        info!("MockMarketDataService: Generated {} for {}", kind, ticker);
        Ok(FinancialStatement {
            kind,
            periods,
            items,
        })
    }
}

#[async_trait]
impl ApiKeyValidator for MockMarketDataService {
    async fn validate_key(&self, api_key: &str) -> Result<(), MarketDataError> {
        if api_key.trim().is_empty() {
            return Err(MarketDataError::MissingApiKey { provider: PROVIDER });
        }
        self.check().map(|_| ())
    }
}
