use crate::application::data_fetch::{ComparisonData, DataFetchAdapter, FetchOutcome};
use crate::application::gap_analysis::GapAnalysis;
use crate::application::session::{DataSource, key_error_message};
use crate::domain::financials::StatementSet;
use crate::domain::market::types::{DateRange, HistoryRequest, PriceBar, Ticker};
use crate::domain::ports::{ApiKeyValidator, FinancialsProvider, PriceHistoryProvider};
use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

/// Builds a Polygon-backed history provider for a given key
pub type PolygonFactory = Arc<dyn Fn(&str) -> Arc<dyn PriceHistoryProvider> + Send + Sync>;

/// Provider handles the worker needs
#[derive(Clone)]
pub struct MarketServices {
    pub yahoo_history: Arc<dyn PriceHistoryProvider>,
    pub financials: Arc<dyn FinancialsProvider>,
    pub key_validator: Arc<dyn ApiKeyValidator>,
    pub polygon: PolygonFactory,
}

impl MarketServices {
    /// Adapter for one dashboard page
    pub fn adapter(&self, source: DataSource, api_key: Option<&str>) -> DataFetchAdapter {
        let history = match (source, api_key) {
            (DataSource::Polygon, Some(key)) => (self.polygon)(key),
            _ => self.yahoo_history.clone(),
        };
        DataFetchAdapter::new(history, self.yahoo_history.clone(), self.financials.clone())
    }
}

/// Work the dashboard asks the background runtime to do
#[derive(Debug, Clone)]
pub enum FetchJob {
    ValidateKey {
        api_key: String,
    },
    PriceHistory {
        source: DataSource,
        api_key: Option<String>,
        request: HistoryRequest,
    },
    Statements {
        ticker: Ticker,
    },
    Comparison {
        first: Ticker,
        first_range: DateRange,
        second: Ticker,
        second_range: DateRange,
    },
    GapAnalysis {
        ticker: Ticker,
        range: DateRange,
    },
}

/// A job tagged with the generation of the dashboard page that asked for it.
///
/// Every page the user opens gets a fresh generation, so a reply addressed to a
/// page that has since been left can be recognized and dropped.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub generation: u64,
    pub job: FetchJob,
}

/// A finished job, still carrying its request's generation
#[derive(Debug, Clone)]
pub struct JobReply {
    pub generation: u64,
    pub result: JobResult,
}

/// Answer to one [`FetchJob`]
#[derive(Debug, Clone)]
pub enum JobResult {
    KeyValidated {
        api_key: String,
        result: std::result::Result<(), String>,
    },
    PriceHistory {
        request: HistoryRequest,
        outcome: FetchOutcome<Vec<PriceBar>>,
    },
    Statements {
        ticker: Ticker,
        outcome: FetchOutcome<StatementSet>,
    },
    Comparison {
        first: Ticker,
        second: Ticker,
        outcome: FetchOutcome<ComparisonData>,
    },
    GapAnalysis {
        ticker: Ticker,
        outcome: FetchOutcome<GapAnalysis>,
    },
}

/// Runs one job to completion
pub async fn run_job(services: &MarketServices, job: FetchJob) -> JobResult {
    match job {
        FetchJob::ValidateKey { api_key } => {
            let result = services
                .key_validator
                .validate_key(&api_key)
                .await
                .map_err(|e| {
                    error!("Worker: API key validation failed: {}", e);
                    key_error_message(&e)
                });
            JobResult::KeyValidated { api_key, result }
        }
        FetchJob::PriceHistory {
            source,
            api_key,
            request,
        } => {
            let adapter = services.adapter(source, api_key.as_deref());
            let outcome = adapter.fetch_price_history(&request).await;
            JobResult::PriceHistory { request, outcome }
        }
        FetchJob::Statements { ticker } => {
            let adapter = services.adapter(DataSource::Yahoo, None);
            let outcome = adapter.fetch_statements(&ticker).await;
            JobResult::Statements { ticker, outcome }
        }
        FetchJob::Comparison {
            first,
            first_range,
            second,
            second_range,
        } => {
            let adapter = services.adapter(DataSource::Yahoo, None);
            let outcome = adapter
                .fetch_comparison(&first, first_range, &second, second_range)
                .await;
            JobResult::Comparison {
                first,
                second,
                outcome,
            }
        }
        FetchJob::GapAnalysis { ticker, range } => {
            let adapter = services.adapter(DataSource::Yahoo, None);
            let outcome = adapter.fetch_gap_analysis(&ticker, range).await;
            JobResult::GapAnalysis { ticker, outcome }
        }
    }
}

/// Receives jobs until the sending side is dropped, one task per job.
pub async fn serve_jobs(
    services: MarketServices,
    mut jobs: UnboundedReceiver<JobRequest>,
    results: Sender<JobReply>,
) {
    info!("Worker: ready for fetch jobs");
    while let Some(JobRequest { generation, job }) = jobs.recv().await {
        let services = services.clone();
        let results = results.clone();
        tokio::spawn(async move {
            let result = run_job(&services, job).await;
            if results.send(JobReply { generation, result }).is_err() {
                error!("Worker: result channel closed, dropping result");
            }
        });
    }
    info!("Worker: job channel closed, stopping");
}

/// Unified event type for the User Interface
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Result(Box<JobReply>),
    Log(String),
}

/// A client interface for the background fetch worker.
/// Abstracts away channel management and provides a clean API for the UI.
pub struct DashboardClient {
    job_tx: UnboundedSender<JobRequest>,
    result_rx: Receiver<JobReply>,
    log_rx: Receiver<String>,
}

impl DashboardClient {
    pub fn new(
        job_tx: UnboundedSender<JobRequest>,
        result_rx: Receiver<JobReply>,
        log_rx: Receiver<String>,
    ) -> Self {
        Self {
            job_tx,
            result_rx,
            log_rx,
        }
    }

    /// Poll for the next available event from any channel.
    /// This is a non-blocking call that checks results before logs.
    pub fn poll_next(&mut self) -> Option<DashboardEvent> {
        if let Ok(result) = self.result_rx.try_recv() {
            return Some(DashboardEvent::Result(Box::new(result)));
        }

        if let Ok(msg) = self.log_rx.try_recv() {
            return Some(DashboardEvent::Log(msg));
        }

        None
    }

    /// Queues `job` on behalf of the page with the given generation
    pub fn submit(&self, generation: u64, job: FetchJob) -> Result<()> {
        self.job_tx
            .send(JobRequest { generation, job })
            .map_err(|e| anyhow::anyhow!("Failed to send fetch job: {}", e))
    }
}
