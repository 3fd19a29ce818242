use crate::application::client::{FetchJob, JobResult};
use crate::application::data_fetch::{ComparisonData, FetchOutcome};
use crate::application::gap_analysis::GapAnalysis;
use crate::application::session::DataSource;
use crate::application::tables::{self, Precision};
use crate::domain::errors::MarketDataError;
use crate::domain::financials::{StatementKind, StatementSet};
use crate::domain::market::timespan::Timespan;
use crate::domain::market::types::{DateRange, HistoryRequest, PriceBar, Ticker};
use crate::domain::table::DataTable;
use crate::infrastructure::export::file_names;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    StockData,
    FinancialStatements,
    StockAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTab {
    Comparison,
    GapAnalysis,
}

/// Sidebar inputs of the price history view
#[derive(Debug, Clone, PartialEq)]
pub struct PriceForm {
    pub ticker: String,
    pub multiplier: u32,
    pub timespan: Timespan,
    pub start: String,
    pub end: String,
}

impl PriceForm {
    pub fn to_request(&self) -> Result<HistoryRequest, MarketDataError> {
        let ticker: Ticker = self.ticker.parse()?;
        let range = DateRange::parse(&self.start, &self.end)?;
        HistoryRequest::new(ticker, range, self.multiplier, self.timespan)
    }
}

/// Two tickers, each with its own date range
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonForm {
    pub first: String,
    pub first_start: String,
    pub first_end: String,
    pub second: String,
    pub second_start: String,
    pub second_end: String,
}

impl ComparisonForm {
    pub fn to_job(&self) -> Result<FetchJob, MarketDataError> {
        Ok(FetchJob::Comparison {
            first: self.first.parse()?,
            first_range: DateRange::parse(&self.first_start, &self.first_end)?,
            second: self.second.parse()?,
            second_range: DateRange::parse(&self.second_start, &self.second_end)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapForm {
    pub ticker: String,
    pub start: String,
    pub end: String,
}

impl GapForm {
    pub fn parse(&self) -> Result<(Ticker, DateRange), MarketDataError> {
        Ok((self.ticker.parse()?, DateRange::parse(&self.start, &self.end)?))
    }
}

/// A table ready for the exporter
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub table: DataTable,
    pub file_name: String,
}

/// Inputs, latest results and in-flight flags of one dashboard page
#[derive(Debug, Clone)]
pub struct DashboardViewModel {
    pub source: DataSource,
    /// Identifies this page instance; replies for other generations are dropped
    pub generation: u64,
    pub tab: DashboardTab,
    pub analysis_tab: AnalysisTab,

    pub price_form: PriceForm,
    pub comparison_form: ComparisonForm,
    pub gap_form: GapForm,

    pub price: Option<(HistoryRequest, FetchOutcome<Vec<PriceBar>>)>,
    pub statements: Option<(Ticker, FetchOutcome<StatementSet>)>,
    pub comparison: Option<(Ticker, Ticker, FetchOutcome<ComparisonData>)>,
    pub gap: Option<(Ticker, FetchOutcome<GapAnalysis>)>,

    /// Display tables, rebuilt only when a result arrives
    pub price_table: DataTable,
    pub statement_tables: Vec<(StatementKind, DataTable)>,
    pub weekly_table: DataTable,
    pub daily_table: DataTable,

    pub price_loading: bool,
    pub statements_loading: bool,
    pub comparison_loading: bool,
    pub gap_loading: bool,

    /// Last input validation failure
    pub input_error: Option<String>,
    /// Outcome of the last export, `Ok` holds the written path
    pub export_status: Option<Result<String, String>>,
}

impl DashboardViewModel {
    pub fn new(source: DataSource) -> Self {
        // Yahoo minute history only reaches back a few days
        let timespan = match source {
            DataSource::Polygon => Timespan::Minute,
            DataSource::Yahoo => Timespan::Day,
        };

        Self {
            source,
            generation: 0,
            tab: DashboardTab::StockData,
            analysis_tab: AnalysisTab::Comparison,
            price_form: PriceForm {
                ticker: "AAPL".to_string(),
                multiplier: 1,
                timespan,
                start: "2014-01-01".to_string(),
                end: "2024-01-01".to_string(),
            },
            comparison_form: ComparisonForm {
                first: "AAPL".to_string(),
                first_start: "2024-01-01".to_string(),
                first_end: "2024-09-30".to_string(),
                second: "MSFT".to_string(),
                second_start: "2024-01-01".to_string(),
                second_end: "2024-09-30".to_string(),
            },
            gap_form: GapForm {
                ticker: "AAPL".to_string(),
                start: "2024-01-01".to_string(),
                end: "2024-09-30".to_string(),
            },
            price: None,
            statements: None,
            comparison: None,
            gap: None,
            price_table: DataTable::default(),
            statement_tables: Vec::new(),
            weekly_table: DataTable::default(),
            daily_table: DataTable::default(),
            price_loading: false,
            statements_loading: false,
            comparison_loading: false,
            gap_loading: false,
            input_error: None,
            export_status: None,
        }
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    fn checked<T>(&mut self, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => {
                self.input_error = None;
                Some(value)
            }
            Err(e) => {
                self.input_error = Some(e);
                None
            }
        }
    }

    /// Job for the Stock Data tab, marking it in flight
    pub fn price_job(&mut self, api_key: Option<&str>) -> Option<FetchJob> {
        let request = self.price_form.to_request().map_err(|e| e.to_string());
        let request = self.checked(request)?;
        self.price_loading = true;
        Some(FetchJob::PriceHistory {
            source: self.source,
            api_key: api_key.map(str::to_string),
            request,
        })
    }

    /// Statements always use the price form's ticker
    pub fn statements_job(&mut self) -> Option<FetchJob> {
        let ticker = self.price_form.ticker.parse::<Ticker>().map_err(|e| e.to_string());
        let ticker = self.checked(ticker)?;
        self.statements_loading = true;
        Some(FetchJob::Statements { ticker })
    }

    pub fn comparison_job(&mut self) -> Option<FetchJob> {
        let job = self.comparison_form.to_job().map_err(|e| e.to_string());
        let job = self.checked(job)?;
        self.comparison_loading = true;
        Some(job)
    }

    pub fn gap_job(&mut self) -> Option<FetchJob> {
        let parsed = self.gap_form.parse().map_err(|e| e.to_string());
        let (ticker, range) = self.checked(parsed)?;
        self.gap_loading = true;
        Some(FetchJob::GapAnalysis { ticker, range })
    }

    /// Stores a finished job; key validation results are not ours to keep.
    pub fn apply(&mut self, result: JobResult) {
        match result {
            JobResult::PriceHistory { request, outcome } => {
                self.price_loading = false;
                self.price_table =
                    tables::price_history_table(&outcome.data, request.timespan, Precision::Display);
                self.price = Some((request, outcome));
            }
            JobResult::Statements { ticker, outcome } => {
                self.statements_loading = false;
                self.statement_tables = StatementKind::ALL
                    .iter()
                    .map(|kind| (*kind, tables::statement_table(outcome.data.get(*kind))))
                    .collect();
                self.statements = Some((ticker, outcome));
            }
            JobResult::Comparison {
                first,
                second,
                outcome,
            } => {
                self.comparison_loading = false;
                self.comparison = Some((first, second, outcome));
            }
            JobResult::GapAnalysis { ticker, outcome } => {
                self.gap_loading = false;
                self.weekly_table = tables::weekly_gap_table(&outcome.data.weeks);
                self.daily_table = tables::daily_gap_table(&outcome.data.daily);
                self.gap = Some((ticker, outcome));
            }
            JobResult::KeyValidated { .. } => {}
        }
    }

    pub fn statement_table(&self, kind: StatementKind) -> Option<&DataTable> {
        self.statement_tables
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, table)| table)
    }

    /// Spreadsheet rows keep the provider's full precision
    pub fn price_export(&self) -> Option<ExportRequest> {
        let (request, outcome) = self.price.as_ref()?;
        Some(ExportRequest {
            table: tables::price_history_table(&outcome.data, request.timespan, Precision::Full),
            file_name: file_names::price_history(&request.ticker, &request.range),
        })
    }

    pub fn statement_export(&self, kind: StatementKind) -> Option<ExportRequest> {
        let (ticker, _) = self.statements.as_ref()?;
        Some(ExportRequest {
            table: self.statement_table(kind)?.clone(),
            file_name: file_names::statement(ticker, kind),
        })
    }

    pub fn comparison_export(&self) -> Option<ExportRequest> {
        let (first, second, outcome) = self.comparison.as_ref()?;
        let summary = outcome.data.summary.as_ref()?;
        Some(ExportRequest {
            table: summary.to_table(),
            file_name: file_names::comparison(first, second),
        })
    }

    pub fn gap_export(&self) -> Option<ExportRequest> {
        let (ticker, _) = self.gap.as_ref()?;
        Some(ExportRequest {
            table: self.weekly_table.clone(),
            file_name: file_names::gap_analysis(ticker),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_source() {
        let yahoo = DashboardViewModel::new(DataSource::Yahoo);
        assert_eq!(yahoo.price_form.timespan, Timespan::Day);
        assert_eq!(yahoo.price_form.start, "2014-01-01");

        let polygon = DashboardViewModel::new(DataSource::Polygon);
        assert_eq!(polygon.price_form.timespan, Timespan::Minute);
        assert_eq!(polygon.comparison_form.second, "MSFT");
        assert_eq!(polygon.gap_form.end, "2024-09-30");
    }

    #[test]
    fn test_price_job_carries_source_and_key() {
        let mut vm = DashboardViewModel::new(DataSource::Polygon);
        vm.price_form.ticker = " msft ".to_string();

        let job = vm.price_job(Some("key-1")).unwrap();
        match job {
            FetchJob::PriceHistory {
                source,
                api_key,
                request,
            } => {
                assert_eq!(source, DataSource::Polygon);
                assert_eq!(api_key.as_deref(), Some("key-1"));
                assert_eq!(request.ticker.as_str(), "MSFT");
                assert_eq!(request.timespan, Timespan::Minute);
            }
            other => panic!("unexpected job {:?}", other),
        }
        assert!(vm.price_loading);
        assert!(vm.input_error.is_none());
    }

    #[test]
    fn test_invalid_inputs_produce_no_job() {
        let mut vm = DashboardViewModel::new(DataSource::Yahoo);
        vm.gap_form.start = "2024-10-01".to_string();

        assert!(vm.gap_job().is_none());
        assert!(!vm.gap_loading);
        assert!(vm.input_error.as_deref().unwrap().contains("after end date"));

        vm.price_form.multiplier = 0;
        assert!(vm.price_job(None).is_none());
        assert!(vm.input_error.as_deref().unwrap().contains("multiplier"));
    }

    #[test]
    fn test_comparison_job_keeps_both_ranges() {
        let mut vm = DashboardViewModel::new(DataSource::Yahoo);
        vm.comparison_form.second_start = "2023-01-01".to_string();
        vm.comparison_form.second_end = "2023-06-30".to_string();

        match vm.comparison_job().unwrap() {
            FetchJob::Comparison {
                first,
                first_range,
                second,
                second_range,
            } => {
                assert_eq!(first.as_str(), "AAPL");
                assert_eq!(first_range, DateRange::parse("2024-01-01", "2024-09-30").unwrap());
                assert_eq!(second.as_str(), "MSFT");
                assert_eq!(second_range, DateRange::parse("2023-01-01", "2023-06-30").unwrap());
            }
            other => panic!("unexpected job {:?}", other),
        }
        assert!(vm.comparison_loading);

        vm.comparison_form.second_start = "2023-07-01".to_string();
        assert!(vm.comparison_job().is_none());
        assert!(vm.input_error.as_deref().unwrap().contains("after end date"));
    }

    #[test]
    fn test_price_export_keeps_full_precision() {
        let mut vm = DashboardViewModel::new(DataSource::Polygon);
        let request = vm.price_form.to_request().unwrap();
        let bar = PriceBar {
            timestamp: chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2024, 1, 2, 14, 31, 0).unwrap(),
            open: "187.1234".parse().unwrap(),
            high: "187.57".parse().unwrap(),
            low: "187".parse().unwrap(),
            close: "187.01".parse().unwrap(),
            volume: "1200".parse().unwrap(),
        };
        vm.apply(JobResult::PriceHistory {
            request,
            outcome: FetchOutcome::ok(vec![bar]),
        });

        assert_eq!(vm.price_table.rows[0][1], "187.12");
        let export = vm.price_export().unwrap();
        assert_eq!(export.table.rows[0][0], "2024-01-02 14:31:00");
        assert_eq!(export.table.rows[0][1], "187.1234");
        assert_eq!(export.file_name, "AAPL_stock_data_2014-01-01_to_2024-01-01.csv");
    }

    #[test]
    fn test_results_clear_loading_flags() {
        let mut vm = DashboardViewModel::new(DataSource::Yahoo);
        let job = vm.gap_job().unwrap();
        assert!(vm.gap_loading);

        let FetchJob::GapAnalysis { ticker, .. } = job else {
            panic!("unexpected job");
        };
        vm.apply(JobResult::GapAnalysis {
            ticker,
            outcome: FetchOutcome::empty_with("No data available for the selected ticker and date range."),
        });

        assert!(!vm.gap_loading);
        let (ticker, outcome) = vm.gap.as_ref().unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
        assert!(outcome.is_error());
        assert_eq!(vm.gap_export().unwrap().file_name, "AAPL_gap_analysis.csv");
    }

    #[test]
    fn test_exports_need_results() {
        let mut vm = DashboardViewModel::new(DataSource::Yahoo);
        assert!(vm.price_export().is_none());
        assert!(vm.comparison_export().is_none());

        let ticker: Ticker = "AAPL".parse().unwrap();
        vm.apply(JobResult::Statements {
            ticker,
            outcome: FetchOutcome::ok(StatementSet::empty()),
        });
        let export = vm.statement_export(StatementKind::CashFlow).unwrap();
        assert_eq!(export.file_name, "AAPL_cash_flow.csv");
    }
}
