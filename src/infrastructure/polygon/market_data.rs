use super::common::{AggsPage, PROVIDER, http_error, parse_aggs_page, parse_envelope};
use crate::config::{HttpConfig, PolygonConfig};
use crate::domain::errors::MarketDataError;
use crate::domain::market::types::{HistoryRequest, PriceBar};
use crate::domain::ports::{ApiKeyValidator, PriceHistoryProvider};
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};

/// Upper bound on pages followed for one request
const MAX_PAGES: usize = 500;

// ===== Aggregates Service (REST) =====

pub struct PolygonMarketDataService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PolygonMarketDataService {
    pub fn new(config: &PolygonConfig, http: &HttpConfig) -> Self {
        Self::builder()
            .api_key(config.api_key.clone())
            .base_url(config.base_url.clone())
            .http_config(http.clone())
            .build()
    }

    pub fn builder() -> PolygonMarketDataServiceBuilder {
        PolygonMarketDataServiceBuilder::default()
    }

    /// Same service bound to another key (the one entered in the UI)
    pub fn with_api_key(&self, api_key: String) -> Self {
        Self {
            client: self.client.clone(),
            api_key,
            base_url: self.base_url.clone(),
        }
    }

    fn aggs_url(&self, request: &HistoryRequest) -> String {
        format!(
            "{}/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            request.ticker,
            request.multiplier,
            request.timespan.to_polygon_string(),
            request.range.from(),
            request.range.to()
        )
    }

    async fn get_body(&self, url: &str, query: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| MarketDataError::Transport {
                provider: PROVIDER,
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| MarketDataError::Transport {
            provider: PROVIDER,
            reason: e.without_url().to_string(),
        })?;

        if !status.is_success() {
            let err = http_error(status.as_u16(), &body);
            error!("PolygonMarketDataService: API error {}: {}", status, err);
            return Err(err);
        }

        Ok(body)
    }

    async fn fetch_page(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<AggsPage, MarketDataError> {
        debug!("PolygonMarketDataService: GET {} (apiKey redacted)", url);
        let body = self.get_body(url, query).await?;
        parse_aggs_page(&body)
    }
}

#[derive(Default)]
pub struct PolygonMarketDataServiceBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    http_config: Option<HttpConfig>,
    client: Option<Client>,
}

impl PolygonMarketDataServiceBuilder {
    pub fn api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = Some(http_config);
        self
    }

    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> PolygonMarketDataService {
        let http_config = self.http_config.unwrap_or_default();
        let client = self
            .client
            .unwrap_or_else(|| HttpClientFactory::create_client_with(&http_config));

        PolygonMarketDataService {
            client,
            api_key: self.api_key.unwrap_or_default().trim().to_string(),
            base_url: self
                .base_url
                .unwrap_or_else(|| "https://api.polygon.io".to_string()),
        }
    }
}

#[async_trait]
impl PriceHistoryProvider for PolygonMarketDataService {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_price_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        if self.api_key.is_empty() {
            return Err(MarketDataError::MissingApiKey { provider: PROVIDER });
        }

        info!(
            "PolygonMarketDataService: Fetching {}x {} bars for {} ({} -> {})",
            request.multiplier,
            request.timespan,
            request.ticker,
            request.range.from(),
            request.range.to()
        );

        let first_query = [
            ("adjusted", "true"),
            ("sort", "asc"),
            ("limit", "50000"),
        ];
        let mut page = self.fetch_page(&self.aggs_url(request), &first_query).await?;
        let mut bars = std::mem::take(&mut page.bars);
        let mut pages = 1;

        // Cursor URLs already carry the original query, only the key is re-sent
        while let Some(next_url) = page.next_url.take() {
            if pages >= MAX_PAGES {
                warn!(
                    "PolygonMarketDataService: Stopping after {} pages for {}",
                    pages, request.ticker
                );
                break;
            }
            page = self.fetch_page(&next_url, &[]).await?;
            bars.append(&mut page.bars);
            pages += 1;
        }

        info!(
            "PolygonMarketDataService: Received {} bars for {} in {} page(s)",
            bars.len(),
            request.ticker,
            pages
        );
        Ok(bars)
    }
}

#[async_trait]
impl ApiKeyValidator for PolygonMarketDataService {
    async fn validate_key(&self, api_key: &str) -> Result<(), MarketDataError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(MarketDataError::MissingApiKey { provider: PROVIDER });
        }

        let probe = self.with_api_key(api_key.to_string());
        let url = format!("{}/v1/marketstatus/now", self.base_url.trim_end_matches('/'));
        debug!("PolygonMarketDataService: Validating API key against {}", url);

        let body = probe.get_body(&url, &[]).await?;
        parse_envelope(&body)?;

        info!("PolygonMarketDataService: API key accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::timespan::Timespan;
    use crate::domain::market::types::DateRange;

    #[test]
    fn test_aggs_url() {
        let service = PolygonMarketDataService::builder()
            .api_key("KEY".to_string())
            .base_url("https://api.polygon.io/".to_string())
            .build();
        let request = HistoryRequest::new(
            "aapl".parse().unwrap(),
            DateRange::parse("2014-01-01", "2024-01-01").unwrap(),
            5,
            Timespan::Minute,
        )
        .unwrap();

        assert_eq!(
            service.aggs_url(&request),
            "https://api.polygon.io/v2/aggs/ticker/AAPL/range/5/minute/2014-01-01/2024-01-01"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let service = PolygonMarketDataService::builder()
            .base_url("http://127.0.0.1:9".to_string())
            .build();
        let request = HistoryRequest::daily(
            "AAPL".parse().unwrap(),
            DateRange::parse("2024-01-01", "2024-02-01").unwrap(),
        );

        let err = service.get_price_history(&request).await.unwrap_err();
        assert!(matches!(err, MarketDataError::MissingApiKey { .. }));
        assert!(service.validate_key("  ").await.is_err());
    }
}
