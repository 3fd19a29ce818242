//! Data fetch adapter
//!
//! Wraps the provider ports so that every failure becomes an empty result plus
//! a message the dashboard can show. Nothing is retried.

use crate::application::comparison::{ComparisonSummary, compare};
use crate::application::gap_analysis::{GapAnalysis, GapOffsets, NO_DATA_MESSAGE, analyze};
use crate::domain::errors::MarketDataError;
use crate::domain::financials::{StatementKind, StatementSet};
use crate::domain::market::types::{DateRange, HistoryRequest, PriceBar, Ticker};
use crate::domain::ports::{FinancialsProvider, PriceHistoryProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shown when a price history request returns no rows
pub const NO_PRICE_DATA_MESSAGE: &str =
    "No data available for the selected parameters. Please try different inputs.";

/// Shown when either side of a comparison has no rows
pub const NO_COMPARISON_DATA_MESSAGE: &str = "No data available for one or both tickers.";

/// Possibly-empty data plus an optional user-facing error message
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome<T> {
    pub data: T,
    pub error: Option<String>,
}

impl<T: Default> FetchOutcome<T> {
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }

    pub fn failed(err: &MarketDataError) -> Self {
        Self {
            data: T::default(),
            error: Some(error_message(err)),
        }
    }

    /// Empty data with an informational message
    pub fn empty_with(message: &str) -> Self {
        Self {
            data: T::default(),
            error: Some(message.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The text the dashboard shows for a provider failure
pub fn error_message(err: &MarketDataError) -> String {
    if err.is_invalid_api_key() {
        err.to_string()
    } else {
        format!("An error occurred: {}", err)
    }
}

/// Both histories and their summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonData {
    pub first: Vec<PriceBar>,
    pub second: Vec<PriceBar>,
    pub summary: Option<ComparisonSummary>,
}

/// Fetches raw tables for one dashboard page.
///
/// `history` serves the page's price history (Polygon or Yahoo), `daily_history`
/// serves the comparison and gap views, which always work on daily bars.
#[derive(Clone)]
pub struct DataFetchAdapter {
    history: Arc<dyn PriceHistoryProvider>,
    daily_history: Arc<dyn PriceHistoryProvider>,
    financials: Arc<dyn FinancialsProvider>,
    offsets: GapOffsets,
}

impl DataFetchAdapter {
    pub fn new(
        history: Arc<dyn PriceHistoryProvider>,
        daily_history: Arc<dyn PriceHistoryProvider>,
        financials: Arc<dyn FinancialsProvider>,
    ) -> Self {
        Self {
            history,
            daily_history,
            financials,
            offsets: GapOffsets::default(),
        }
    }

    pub fn with_offsets(mut self, offsets: GapOffsets) -> Self {
        self.offsets = offsets;
        self
    }

    pub fn history_provider_name(&self) -> &'static str {
        self.history.name()
    }

    pub async fn fetch_price_history(&self, request: &HistoryRequest) -> FetchOutcome<Vec<PriceBar>> {
        match self.history.get_price_history(request).await {
            Ok(bars) if bars.is_empty() => {
                warn!(
                    "DataFetchAdapter: {} returned no bars for {}",
                    self.history.name(),
                    request.ticker
                );
                FetchOutcome::empty_with(NO_PRICE_DATA_MESSAGE)
            }
            Ok(bars) => {
                info!(
                    "DataFetchAdapter: {} bars for {} from {}",
                    bars.len(),
                    request.ticker,
                    self.history.name()
                );
                FetchOutcome::ok(bars)
            }
            Err(e) => {
                error!("DataFetchAdapter: price history for {} failed: {}", request.ticker, e);
                FetchOutcome::failed(&e)
            }
        }
    }

    /// All three statements; one failure empties the whole set.
    pub async fn fetch_statements(&self, ticker: &Ticker) -> FetchOutcome<StatementSet> {
        let result = tokio::try_join!(
            self.financials
                .get_financial_statement(ticker, StatementKind::IncomeStatement),
            self.financials
                .get_financial_statement(ticker, StatementKind::CashFlow),
            self.financials
                .get_financial_statement(ticker, StatementKind::BalanceSheet),
        );

        match result {
            Ok((income_statement, cash_flow, balance_sheet)) => {
                let set = StatementSet {
                    income_statement,
                    cash_flow,
                    balance_sheet,
                };
                if set.is_empty() {
                    warn!("DataFetchAdapter: no financial statements for {}", ticker);
                }
                FetchOutcome::ok(set)
            }
            Err(e) => {
                error!("DataFetchAdapter: financial statements for {} failed: {}", ticker, e);
                FetchOutcome::failed(&e)
            }
        }
    }

    pub async fn fetch_gap_analysis(&self, ticker: &Ticker, range: DateRange) -> FetchOutcome<GapAnalysis> {
        let request = HistoryRequest::daily(ticker.clone(), range);
        match self.daily_history.get_price_history(&request).await {
            Ok(bars) => {
                let analysis = analyze(&bars, self.offsets);
                if analysis.is_empty() {
                    warn!("DataFetchAdapter: no bars for gap analysis of {}", ticker);
                    return FetchOutcome::empty_with(NO_DATA_MESSAGE);
                }
                info!(
                    "DataFetchAdapter: gap analysis for {}: {} weeks",
                    ticker,
                    analysis.weeks.len()
                );
                FetchOutcome::ok(analysis)
            }
            Err(e) => {
                error!("DataFetchAdapter: gap analysis history for {} failed: {}", ticker, e);
                FetchOutcome::failed(&e)
            }
        }
    }

    /// Each ticker is fetched over its own range.
    pub async fn fetch_comparison(
        &self,
        first: &Ticker,
        first_range: DateRange,
        second: &Ticker,
        second_range: DateRange,
    ) -> FetchOutcome<ComparisonData> {
        let first_request = HistoryRequest::daily(first.clone(), first_range);
        let second_request = HistoryRequest::daily(second.clone(), second_range);

        let (a, b) = tokio::join!(
            self.daily_history.get_price_history(&first_request),
            self.daily_history.get_price_history(&second_request),
        );

        let (first_bars, second_bars) = match (a, b) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                error!("DataFetchAdapter: comparison {} vs {} failed: {}", first, second, e);
                return FetchOutcome::failed(&e);
            }
        };

        let summary = compare((first, first_bars.as_slice()), (second, second_bars.as_slice()));
        if summary.is_none() {
            warn!("DataFetchAdapter: comparison {} vs {} has an empty side", first, second);
            return FetchOutcome::empty_with(NO_COMPARISON_DATA_MESSAGE);
        }

        FetchOutcome::ok(ComparisonData {
            first: first_bars,
            second: second_bars,
            summary,
        })
    }
}
