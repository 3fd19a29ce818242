//! Headless Stock Dashboard
//!
//! Fetches the same tables the dashboard shows and prints them, optionally
//! writing each one to a spreadsheet in `EXPORT_DIR`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stockdash::application::data_fetch::{DataFetchAdapter, FetchOutcome};
use stockdash::application::session::DataSource;
use stockdash::application::tables::{self, Precision};
use stockdash::config::{Config, DataMode};
use stockdash::domain::financials::StatementKind;
use stockdash::domain::market::timespan::Timespan;
use stockdash::domain::market::types::{DateRange, HistoryRequest, Ticker};
use stockdash::domain::table::DataTable;
use stockdash::infrastructure::ServiceFactory;
use stockdash::infrastructure::export::{SpreadsheetExporter, file_names};
use std::str::FromStr;
use tracing::{Level, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Yahoo,
    Polygon,
    /// Synthetic offline data
    Mock,
}

#[derive(Parser)]
#[command(author, version, about = "Stock Dashboard (headless)", long_about = None)]
struct Cli {
    /// Rows printed per table (0 prints all)
    #[arg(long, global = true, default_value = "20")]
    rows: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price history for one ticker
    History {
        #[arg(short, long, default_value = "AAPL")]
        ticker: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long, default_value = "2014-01-01")]
        from: String,

        /// End date (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-01")]
        to: String,

        #[arg(long, value_enum, default_value = "yahoo")]
        source: Source,

        /// Polygon key, defaults to POLYGON_API_KEY
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long, default_value = "1")]
        multiplier: u32,

        /// second, minute, hour, day, week, month, quarter or year
        #[arg(long, default_value = "day")]
        timespan: String,

        /// Write the table to EXPORT_DIR
        #[arg(long)]
        export: bool,
    },
    /// Income statement, cash flow and balance sheet
    Financials {
        #[arg(short, long, default_value = "AAPL")]
        ticker: String,

        #[arg(long, value_enum, default_value = "yahoo")]
        source: Source,

        #[arg(long)]
        export: bool,
    },
    /// Weekly gap analysis
    Gap {
        #[arg(short, long, default_value = "AAPL")]
        ticker: String,

        #[arg(long, default_value = "2024-01-01")]
        from: String,

        #[arg(long, default_value = "2024-09-30")]
        to: String,

        #[arg(long, value_enum, default_value = "yahoo")]
        source: Source,

        #[arg(long)]
        export: bool,
    },
    /// Highest open and lowest close of two tickers, each over its own range
    Compare {
        #[arg(long, default_value = "AAPL")]
        first: String,

        #[arg(long, default_value = "2024-01-01")]
        first_from: String,

        #[arg(long, default_value = "2024-09-30")]
        first_to: String,

        #[arg(long, default_value = "MSFT")]
        second: String,

        /// Defaults to --first-from
        #[arg(long)]
        second_from: Option<String>,

        /// Defaults to --first-to
        #[arg(long)]
        second_to: Option<String>,

        #[arg(long, value_enum, default_value = "yahoo")]
        source: Source,

        #[arg(long)]
        export: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    let rows = cli.rows;

    match cli.command {
        Commands::History {
            ticker,
            from,
            to,
            source,
            api_key,
            multiplier,
            timespan,
            export,
        } => {
            let timespan = Timespan::from_str(&timespan)?;
            let request = HistoryRequest::new(
                parse_ticker(&ticker)?,
                parse_range(&from, &to)?,
                multiplier,
                timespan,
            )?;
            let api_key = api_key.unwrap_or_else(|| config.polygon.api_key.clone());
            let adapter = build_adapter(&mut config, source, &api_key);
            info!(
                "Fetching {} {} x {} bars from {}",
                request.ticker,
                request.multiplier,
                request.timespan,
                adapter.history_provider_name()
            );

            let outcome = adapter.fetch_price_history(&request).await;
            let bars = checked(outcome)?;
            let table = tables::price_history_table(&bars, request.timespan, Precision::Display);
            print_table(&format!("{} price history", request.ticker), &table, rows);

            if export {
                let full = tables::price_history_table(&bars, request.timespan, Precision::Full);
                write(&config, &full, &file_names::price_history(&request.ticker, &request.range))?;
            }
        }
        Commands::Financials {
            ticker,
            source,
            export,
        } => {
            if source == Source::Polygon {
                anyhow::bail!("Financial statements come from Yahoo Finance; use --source yahoo or mock");
            }
            let ticker = parse_ticker(&ticker)?;
            let adapter = build_adapter(&mut config, source, "");

            let statements = checked(adapter.fetch_statements(&ticker).await)?;
            for kind in StatementKind::ALL {
                let table = tables::statement_table(statements.get(kind));
                print_table(&format!("{} {}", ticker, kind.title()), &table, rows);
                if export && !table.is_empty() {
                    write(&config, &table, &file_names::statement(&ticker, kind))?;
                }
            }
        }
        Commands::Gap {
            ticker,
            from,
            to,
            source,
            export,
        } => {
            let ticker = parse_ticker(&ticker)?;
            let range = parse_range(&from, &to)?;
            let adapter = build_adapter(&mut config, source, "");

            let analysis = checked(adapter.fetch_gap_analysis(&ticker, range).await)?;
            let weekly = tables::weekly_gap_table(&analysis.weeks);
            print_table(&format!("{} weekly gaps", ticker), &weekly, rows);
            print_table("Daily gaps", &tables::daily_gap_table(&analysis.daily), rows);
            match &analysis.summary {
                Some(summary) => print_table("Highest gap week", &summary.to_table(), 0),
                None => println!("\nNo week has a gap percentage in this range.\n"),
            }

            if export {
                write(&config, &weekly, &file_names::gap_analysis(&ticker))?;
            }
        }
        Commands::Compare {
            first,
            first_from,
            first_to,
            second,
            second_from,
            second_to,
            source,
            export,
        } => {
            let first = parse_ticker(&first)?;
            let second = parse_ticker(&second)?;
            let first_range = parse_range(&first_from, &first_to)?;
            let second_range = parse_range(
                second_from.as_deref().unwrap_or(&first_from),
                second_to.as_deref().unwrap_or(&first_to),
            )?;
            let adapter = build_adapter(&mut config, source, "");

            let comparison = checked(
                adapter
                    .fetch_comparison(&first, first_range, &second, second_range)
                    .await,
            )?;
            let summary = comparison
                .summary
                .context("Comparison needs price history for both tickers")?;
            let table = summary.to_table();
            print_table(&format!("{} vs {}", first, second), &table, 0);

            if export {
                write(&config, &table, &file_names::comparison(&first, &second))?;
            }
        }
    }

    Ok(())
}

/// Adapter for the chosen source; `mock` switches the whole config offline.
fn build_adapter(config: &mut Config, source: Source, api_key: &str) -> DataFetchAdapter {
    if source == Source::Mock {
        config.mode = DataMode::Mock;
    }
    let services = ServiceFactory::create_services(config);
    match source {
        Source::Polygon => services.adapter(DataSource::Polygon, Some(api_key)),
        Source::Yahoo | Source::Mock => services.adapter(DataSource::Yahoo, None),
    }
}

fn parse_ticker(value: &str) -> Result<Ticker> {
    Ticker::from_str(value).with_context(|| format!("Invalid ticker: {}", value))
}

fn parse_range(from: &str, to: &str) -> Result<DateRange> {
    DateRange::parse(from, to).context("Invalid date range")
}

/// Turns a user-facing failure message into an error exit
fn checked<T: Default>(outcome: FetchOutcome<T>) -> Result<T> {
    match outcome.error {
        Some(message) => anyhow::bail!(message),
        None => Ok(outcome.data),
    }
}

fn write(config: &Config, table: &DataTable, file_name: &str) -> Result<()> {
    let exporter = SpreadsheetExporter::new(&config.export_dir);
    let path = exporter
        .export(table, file_name)
        .with_context(|| format!("Failed to export {}", file_name))?;
    println!("✅ Saved {}", path.display());
    Ok(())
}

fn print_table(title: &str, table: &DataTable, limit: usize) {
    println!("\n{}", title);
    println!("{}", "=".repeat(title.chars().count().max(20)));

    if table.is_empty() {
        println!("(no rows)");
        return;
    }

    let shown = if limit == 0 { table.rows.len() } else { limit.min(table.rows.len()) };
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            table.rows[..shown]
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(table.columns.as_slice()));
    for row in &table.rows[..shown] {
        println!("{}", line(row.as_slice()));
    }
    if shown < table.rows.len() {
        println!("... {} more rows", table.rows.len() - shown);
    }
}
