use crate::domain::errors::MarketDataError;
use crate::domain::financials::{FinancialStatement, StatementKind};
use crate::domain::market::types::{HistoryRequest, PriceBar, Ticker};
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Short provider name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Bars for the request, ascending by timestamp
    async fn get_price_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PriceBar>, MarketDataError>;
}

#[async_trait]
pub trait FinancialsProvider: Send + Sync {
    async fn get_financial_statement(
        &self,
        ticker: &Ticker,
        kind: StatementKind,
    ) -> Result<FinancialStatement, MarketDataError>;
}

#[async_trait]
pub trait ApiKeyValidator: Send + Sync {
    /// Succeeds when the provider accepts `api_key`
    async fn validate_key(&self, api_key: &str) -> Result<(), MarketDataError>;
}
