use stockdash::application::client::{DashboardClient, serve_jobs};
use stockdash::config::Config;
use stockdash::infrastructure::{ServiceFactory, SpreadsheetExporter};
use stockdash::interfaces::ui::StockDashboardApp;

use anyhow::Context;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

// A writer that sends logs to the UI via a crossbeam channel
struct ChannelWriter {
    sender: crossbeam_channel::Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf).to_string();
        let _ = self.sender.try_send(msg);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// Cloneable wrapper for MakeWriter
#[derive(Clone)]
struct ChannelWriterFactory {
    sender: crossbeam_channel::Sender<String>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ChannelWriterFactory {
    type Writer = ChannelWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ChannelWriter {
            sender: self.sender.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (log_tx, log_rx) = crossbeam_channel::unbounded();

    // Stdout + in-app log panel
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    let ui_layer = tracing_subscriber::fmt::layer()
        .with_writer(ChannelWriterFactory { sender: log_tx })
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .with(ui_layer)
        .init();

    info!("Initializing Stock Dashboard...");

    let config = Config::from_env().context("Failed to load configuration")?;
    let services = ServiceFactory::create_services(&config);

    let (job_tx, job_rx) = tokio::sync::mpsc::unbounded_channel();
    let (result_tx, result_rx) = crossbeam_channel::unbounded();

    // Fetches run on a Tokio runtime in a background thread so the UI never blocks
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to build Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async move {
            info!("Background Runtime Started.");
            serve_jobs(services, job_rx, result_tx).await;
        });
    });

    let client = DashboardClient::new(job_tx, result_rx, log_rx);
    let app = StockDashboardApp::new(
        client,
        SpreadsheetExporter::new(config.export_dir.clone()),
        &config.polygon.api_key,
    );

    info!("Launching UI ({:?} data).", config.mode);

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Stock Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Stock Dashboard",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Eframe error: {}", e))?;

    Ok(())
}
