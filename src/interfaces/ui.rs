use crate::application::client::{DashboardClient, DashboardEvent, FetchJob, JobReply, JobResult};
use crate::application::session::{DataSource, Page, SessionContext};
use crate::infrastructure::export::SpreadsheetExporter;
use crate::interfaces::dashboard::{DashboardAction, render_dashboard};
use crate::interfaces::design_system::DesignSystem;
use crate::interfaces::home::{HomeAction, HomeState, render_home};
use crate::interfaces::view_models::dashboard_view_model::{DashboardViewModel, ExportRequest};
use eframe::egui;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{error, info};

const MAX_LOG_LINES: usize = 500;

pub struct StockDashboardApp {
    client: DashboardClient,
    session: SessionContext,
    home: HomeState,
    dashboard: Option<DashboardViewModel>,
    /// Generation handed to the most recently opened dashboard
    generation: u64,
    exporter: SpreadsheetExporter,
    logs: VecDeque<String>,
    show_logs: bool,
}

impl StockDashboardApp {
    pub fn new(client: DashboardClient, exporter: SpreadsheetExporter, configured_key: &str) -> Self {
        Self {
            client,
            session: SessionContext::new(),
            home: HomeState::with_api_key(configured_key),
            dashboard: None,
            generation: 0,
            exporter,
            logs: VecDeque::new(),
            show_logs: false,
        }
    }

    pub fn page(&self) -> &Page {
        self.session.page()
    }

    pub fn dashboard(&self) -> Option<&DashboardViewModel> {
        self.dashboard.as_ref()
    }

    pub fn home(&self) -> &HomeState {
        &self.home
    }

    /// Drains everything the worker has posted since the last frame
    pub fn process_events(&mut self) {
        while let Some(event) = self.client.poll_next() {
            match event {
                DashboardEvent::Result(reply) => self.handle_reply(*reply),
                DashboardEvent::Log(line) => {
                    if self.logs.len() == MAX_LOG_LINES {
                        self.logs.pop_front();
                    }
                    self.logs.push_back(line.trim_end().to_string());
                }
            }
        }
    }

    fn open_dashboard(&mut self, source: DataSource) {
        self.generation += 1;
        self.dashboard = Some(DashboardViewModel::new(source).with_generation(self.generation));
    }

    fn handle_reply(&mut self, reply: JobReply) {
        match reply.result {
            JobResult::KeyValidated { api_key, result } => {
                if !self.home.validating || self.page() != &Page::Home {
                    info!("UI: ignoring stale key validation");
                    return;
                }
                self.home.validating = false;
                match result {
                    Ok(()) => match self.session.launch_polygon(&api_key) {
                        Ok(()) => {
                            self.home.error = None;
                            self.open_dashboard(DataSource::Polygon);
                        }
                        Err(e) => self.home.error = Some(e.to_string()),
                    },
                    Err(message) => self.home.error = Some(message),
                }
            }
            other => match self.dashboard.as_mut() {
                Some(dashboard) if dashboard.generation == reply.generation => dashboard.apply(other),
                _ => info!("UI: dropping result addressed to a dashboard that was left"),
            },
        }
    }

    fn submit(&mut self, job: FetchJob) {
        if let Err(e) = self.client.submit(self.generation, job) {
            error!("UI: {}", e);
            if let Some(dashboard) = self.dashboard.as_mut() {
                dashboard.input_error = Some(e.to_string());
            }
        }
    }

    pub fn handle_home_action(&mut self, action: HomeAction) {
        match action {
            HomeAction::LaunchYahoo => {
                self.session.launch_yahoo();
                self.open_dashboard(DataSource::Yahoo);
            }
            HomeAction::ValidateKey(api_key) => {
                if let Err(e) = self.client.submit(self.generation, FetchJob::ValidateKey { api_key }) {
                    error!("UI: {}", e);
                    self.home.validating = false;
                    self.home.error = Some(e.to_string());
                }
            }
        }
    }

    fn export(&mut self, request: ExportRequest) {
        let status = self
            .exporter
            .export(&request.table, &request.file_name)
            .map(|path| path.display().to_string())
            .map_err(|e| e.to_string());
        if let Err(e) = &status {
            error!("UI: export of {} failed: {}", request.file_name, e);
        }
        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.export_status = Some(status);
        }
    }

    pub fn handle_dashboard_action(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::Submit(job) => self.submit(job),
            DashboardAction::Export(request) => self.export(request),
            DashboardAction::Back => {
                self.session.back();
                self.dashboard = None;
                self.home.validating = false;
                self.home.show_key_input = false;
            }
        }
    }

    fn render_log_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.toggle_value(&mut self.show_logs, "System logs");
                    ui.label(
                        egui::RichText::new(format!("{} lines", self.logs.len()))
                            .size(11.0)
                            .color(DesignSystem::TEXT_MUTED),
                    );
                });
                if !self.show_logs {
                    return;
                }
                egui::ScrollArea::vertical()
                    .id_salt("log_scroll")
                    .max_height(160.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.logs {
                            ui.label(
                                egui::RichText::new(line)
                                    .monospace()
                                    .size(11.0)
                                    .color(DesignSystem::TEXT_SECONDARY),
                            );
                        }
                    });
            });
    }
}

impl eframe::App for StockDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(DesignSystem::theme());

        self.process_events();
        self.render_log_panel(ctx);

        if self.page() == &Page::Home {
            let action = egui::CentralPanel::default()
                .frame(DesignSystem::main_frame())
                .show(ctx, |ui| render_home(&mut self.home, ui))
                .inner;
            if let Some(action) = action {
                self.handle_home_action(action);
            }
        } else if let Some(dashboard) = self.dashboard.as_mut() {
            let api_key = self.session.api_key().map(str::to_string);
            let actions = render_dashboard(dashboard, api_key.as_deref(), ctx);
            for action in actions {
                self.handle_dashboard_action(action);
            }
        }

        // Worker results arrive on a channel, so keep polling
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::client::JobRequest;
    use crate::application::data_fetch::FetchOutcome;
    use crate::domain::financials::StatementSet;
    use crate::domain::market::types::{DateRange, HistoryRequest, PriceBar};
    use crossbeam_channel::Sender;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn app() -> (StockDashboardApp, UnboundedReceiver<JobRequest>, Sender<JobReply>) {
        let (job_tx, job_rx) = tokio::sync::mpsc::unbounded_channel();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let (_log_tx, log_rx) = crossbeam_channel::unbounded();
        let client = DashboardClient::new(job_tx, result_rx, log_rx);
        let app = StockDashboardApp::new(client, SpreadsheetExporter::new("."), "");
        (app, job_rx, result_tx)
    }

    fn validated(generation: u64, api_key: &str, result: Result<(), String>) -> JobReply {
        JobReply {
            generation,
            result: JobResult::KeyValidated {
                api_key: api_key.to_string(),
                result,
            },
        }
    }

    fn price_reply(generation: u64, ticker: &str) -> JobReply {
        let request = HistoryRequest::daily(
            ticker.parse().unwrap(),
            DateRange::parse("2024-01-02", "2024-01-02").unwrap(),
        );
        let bar = PriceBar {
            timestamp: request.range.from().and_hms_opt(0, 0, 0).unwrap().and_utc(),
            open: dec!(248.42),
            high: dec!(251.25),
            low: dec!(244.41),
            close: dec!(248.42),
            volume: dec!(104654200),
        };
        JobReply {
            generation,
            result: JobResult::PriceHistory {
                request,
                outcome: FetchOutcome::ok(vec![bar]),
            },
        }
    }

    #[test]
    fn test_polygon_page_needs_validated_key() {
        let (mut app, mut jobs, results) = app();
        app.home.api_key_input = "pk_bad".to_string();
        app.home.validating = true;
        app.handle_home_action(HomeAction::ValidateKey("pk_bad".to_string()));
        assert!(matches!(
            jobs.try_recv(),
            Ok(JobRequest {
                job: FetchJob::ValidateKey { .. },
                ..
            })
        ));

        results
            .send(validated(
                0,
                "pk_bad",
                Err("Invalid API Key. Please enter a valid API key.".to_string()),
            ))
            .unwrap();
        app.process_events();

        assert_eq!(app.page(), &Page::Home);
        assert!(!app.home().validating);
        assert_eq!(
            app.home().error.as_deref(),
            Some("Invalid API Key. Please enter a valid API key.")
        );

        app.home.validating = true;
        results.send(validated(0, "pk_good", Ok(()))).unwrap();
        app.process_events();

        assert_eq!(
            app.page(),
            &Page::Polygon {
                api_key: "pk_good".to_string()
            }
        );
        assert_eq!(app.dashboard().unwrap().source, DataSource::Polygon);
    }

    #[test]
    fn test_back_returns_home_and_drops_late_results() {
        let (mut app, _jobs, results) = app();
        app.handle_home_action(HomeAction::LaunchYahoo);
        assert_eq!(app.page(), &Page::Yahoo);

        app.handle_dashboard_action(DashboardAction::Back);
        assert_eq!(app.page(), &Page::Home);
        assert!(app.dashboard().is_none());

        results
            .send(JobReply {
                generation: 1,
                result: JobResult::Statements {
                    ticker: "AAPL".parse().unwrap(),
                    outcome: FetchOutcome::ok(StatementSet::empty()),
                },
            })
            .unwrap();
        app.process_events();
        assert!(app.dashboard().is_none());
    }

    #[test]
    fn test_result_from_left_page_skips_new_dashboard() {
        let (mut app, mut jobs, results) = app();

        app.handle_home_action(HomeAction::LaunchYahoo);
        let yahoo_job = app.dashboard.as_mut().unwrap().price_job(None).unwrap();
        app.handle_dashboard_action(DashboardAction::Submit(yahoo_job));
        let yahoo_generation = jobs.try_recv().unwrap().generation;

        app.handle_dashboard_action(DashboardAction::Back);
        app.home.validating = true;
        results.send(validated(yahoo_generation, "pk_good", Ok(()))).unwrap();
        app.process_events();
        assert_eq!(app.dashboard().unwrap().source, DataSource::Polygon);
        assert_ne!(app.dashboard().unwrap().generation, yahoo_generation);

        // The Yahoo page's answer arrives after the Polygon page opened
        results.send(price_reply(yahoo_generation, "TSLA")).unwrap();
        app.process_events();
        let polygon = app.dashboard().unwrap();
        assert!(polygon.price.is_none());
        assert!(polygon.price_table.is_empty());

        let polygon_generation = polygon.generation;
        results.send(price_reply(polygon_generation, "NVDA")).unwrap();
        app.process_events();
        let (request, _) = app.dashboard().unwrap().price.as_ref().unwrap();
        assert_eq!(request.ticker.as_str(), "NVDA");
    }
}
