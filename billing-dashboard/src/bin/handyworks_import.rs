//! HandyWorks account import and reporting tool.
//!
//! Usage:
//!   handyworks-import tsv data/handyworks_export.tsv
//!   handyworks-import csv data/hwsales.csv --dry-run
//!   handyworks-import report --status overdue --export overdue.csv
//!
//! MongoDB settings come from the same `APP__` variables as the dashboard.

use anyhow::Context;
use billing_dashboard::config::DashboardConfig;
use billing_dashboard::dtos::UserListParams;
use billing_dashboard::engine::PaymentClassifier;
use billing_dashboard::import::{import_file, preview_file, ImportSource};
use billing_dashboard::report::run_report;
use billing_dashboard::services::{MongoDb, UserStore};
use chrono::Utc;
use clap::{Parser, Subcommand};
use service_core::observability::init_cli_logging;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "handyworks-import")]
#[command(about = "Import HandyWorks account exports and report on billing status")]
struct Args {
    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the tab separated MS Access export
    Tsv {
        file: PathBuf,
        /// Map and count records without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Import the comma separated hwsales.csv export
    Csv {
        file: PathBuf,
        /// Map and count records without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the billing summary and account table
    Report {
        #[arg(long)]
        search: Option<String>,
        /// paid, pending, overdue or all
        #[arg(long)]
        status: Option<String>,
        /// Raw account status, e.g. A
        #[arg(long)]
        user_status: Option<String>,
        /// Also write the matching accounts to this CSV file, or to a dated
        /// file in this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

async fn connect(config: &DashboardConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    let db = MongoDb::connect(
        &config.mongodb.uri,
        &config.mongodb.database,
        &config.collection,
    )
    .await
    .context("Failed to connect to MongoDB")?;
    let store: Arc<dyn UserStore> = Arc::new(db);
    Ok(store)
}

async fn run_import(
    config: &DashboardConfig,
    source: ImportSource,
    file: PathBuf,
    dry_run: bool,
) -> anyhow::Result<()> {
    info!(file = %file.display(), format = source.format_name(), "Starting import");
    let report = if dry_run {
        preview_file(source, &file, Utc::now()).await?
    } else {
        let store = connect(config).await?;
        import_file(store.as_ref(), source, &file, Utc::now()).await?
    };

    println!(
        "Imported {} accounts ({} skipped, {} failed)",
        report.imported,
        report.skipped,
        report.error_count()
    );
    for failure in &report.failures {
        println!("  account {}: {}", failure.acct_num, failure.error);
    }

    if report.error_count() > 0 {
        anyhow::bail!("{} accounts failed to import", report.error_count());
    }
    Ok(())
}

async fn report(
    config: &DashboardConfig,
    params: UserListParams,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let query = params.into_query()?;
    let store = connect(config).await?;
    let classifier = PaymentClassifier::new(config.overdue_after_days);

    let outcome = run_report(
        store.as_ref(),
        &classifier,
        query,
        export.as_deref(),
        std::io::stdout(),
        Utc::now(),
    )
    .await?;

    if let Some(path) = outcome.exported {
        println!("Exported {} accounts to {}", outcome.shown, path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_cli_logging(&args.log_level)?;

    let config = DashboardConfig::load().context("Failed to load configuration")?;

    match args.command {
        Command::Tsv { file, dry_run } => {
            run_import(&config, ImportSource::MsAccessTsv, file, dry_run).await
        }
        Command::Csv { file, dry_run } => {
            run_import(&config, ImportSource::HwSalesCsv, file, dry_run).await
        }
        Command::Report {
            search,
            status,
            user_status,
            export,
        } => {
            let params = UserListParams {
                search,
                status,
                user_status,
            };
            report(&config, params, export).await
        }
    }
}
