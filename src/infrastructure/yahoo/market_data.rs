use super::common::{PROVIDER, parse_chart, parse_timeseries, timeseries_types};
use crate::config::{HttpConfig, YahooConfig};
use crate::domain::errors::MarketDataError;
use crate::domain::financials::{FinancialStatement, StatementKind};
use crate::domain::market::types::{HistoryRequest, PriceBar, Ticker};
use crate::domain::ports::{FinancialsProvider, PriceHistoryProvider};
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, error, info, warn};

/// Earliest `period1` the fundamentals endpoint accepts (2016-12-31)
const FUNDAMENTALS_START: i64 = 1_483_142_400;

pub struct YahooFinanceService {
    client: Client,
    chart_url: String,
    fundamentals_url: String,
}

impl YahooFinanceService {
    pub fn new(config: &YahooConfig, http: &HttpConfig) -> Self {
        Self::builder()
            .chart_url(config.chart_url.clone())
            .fundamentals_url(config.fundamentals_url.clone())
            .http_config(http.clone())
            .build()
    }

    pub fn builder() -> YahooFinanceServiceBuilder {
        YahooFinanceServiceBuilder::default()
    }

    async fn get_body(&self, url: &str, query: &[(&str, String)]) -> Result<String, MarketDataError> {
        debug!("YahooFinanceService: GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketDataError::Transport {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| MarketDataError::Transport {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

        // Chart errors arrive as 404 with a JSON error object; let the parser report them
        if !status.is_success() && !body.trim_start().starts_with('{') {
            error!("YahooFinanceService: API error {} for {}", status, url);
            return Err(MarketDataError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        Ok(body)
    }
}

#[derive(Default)]
pub struct YahooFinanceServiceBuilder {
    chart_url: Option<String>,
    fundamentals_url: Option<String>,
    http_config: Option<HttpConfig>,
}

impl YahooFinanceServiceBuilder {
    pub fn chart_url(mut self, chart_url: String) -> Self {
        self.chart_url = Some(chart_url);
        self
    }

    pub fn fundamentals_url(mut self, fundamentals_url: String) -> Self {
        self.fundamentals_url = Some(fundamentals_url);
        self
    }

    pub fn http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = Some(http_config);
        self
    }

    pub fn build(self) -> YahooFinanceService {
        let http_config = self.http_config.unwrap_or_default();
        YahooFinanceService {
            client: HttpClientFactory::create_client_with(&http_config),
            chart_url: self
                .chart_url
                .unwrap_or_else(|| "https://query1.finance.yahoo.com".to_string()),
            fundamentals_url: self
                .fundamentals_url
                .unwrap_or_else(|| "https://query2.finance.yahoo.com".to_string()),
        }
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceService {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_price_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        info!(
            "YahooFinanceService: Fetching {} history for {} ({} -> {})",
            request.timespan.to_yahoo_interval(),
            request.ticker,
            request.range.from(),
            request.range.to()
        );

        if request.multiplier > 1 {
            warn!(
                "YahooFinanceService: multiplier {} ignored, Yahoo only serves fixed intervals",
                request.multiplier
            );
        }

        let url = format!(
            "{}/v8/finance/chart/{}",
            self.chart_url.trim_end_matches('/'),
            request.ticker
        );
        let query = [
            ("period1", request.range.start_timestamp().to_string()),
            ("period2", request.range.end_timestamp().to_string()),
            ("interval", request.timespan.to_yahoo_interval().to_string()),
            ("events", "history".to_string()),
        ];

        let body = self.get_body(&url, &query).await?;
        let bars = parse_chart(&body, !request.timespan.is_intraday())?;

        info!(
            "YahooFinanceService: Received {} bars for {}",
            bars.len(),
            request.ticker
        );
        Ok(bars)
    }
}

#[async_trait]
impl FinancialsProvider for YahooFinanceService {
    async fn get_financial_statement(
        &self,
        ticker: &Ticker,
        kind: StatementKind,
    ) -> Result<FinancialStatement, MarketDataError> {
        info!("YahooFinanceService: Fetching {} for {}", kind, ticker);

        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.fundamentals_url.trim_end_matches('/'),
            ticker
        );
        let query = [
            ("symbol", ticker.to_string()),
            ("type", timeseries_types(kind)),
            ("period1", FUNDAMENTALS_START.to_string()),
            ("period2", Utc::now().timestamp().to_string()),
        ];

        let body = self.get_body(&url, &query).await?;
        let statement = parse_timeseries(&body, kind)?;

        info!(
            "YahooFinanceService: {} for {}: {} line items over {} periods",
            kind,
            ticker,
            statement.items.len(),
            statement.periods.len()
        );
        Ok(statement)
    }
}
