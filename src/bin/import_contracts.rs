use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use landledger::config::Config;
use landledger::modules::contracts::repositories::MySqlContractRepository;
use landledger::modules::contracts::services::ContractImporter;
use landledger::modules::installments::repositories::MySqlInstallmentRepository;
use landledger::modules::installments::services::ScheduleService;

/// Load contracts from a spreadsheet export and generate their
/// installment schedules.
#[derive(Debug, Parser)]
#[command(name = "import-contracts", version)]
struct Args {
    /// CSV file with one contract per row
    file: PathBuf,

    /// Cutoff for the paid/pending backfill (yyyy-mm-dd), defaults to today
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Parse and validate without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let as_of = args.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let config = Config::from_env().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    let pool = config
        .database
        .create_pool()
        .await
        .context("connecting to the database")?;

    let contracts = Arc::new(MySqlContractRepository::new(pool.clone()));
    let installments = Arc::new(MySqlInstallmentRepository::new(pool));
    let schedules = Arc::new(ScheduleService::new(contracts.clone(), installments));
    let importer = ContractImporter::new(contracts, schedules);

    let summary = importer
        .import_path(&args.file, as_of, args.dry_run)
        .await
        .with_context(|| format!("importing {}", args.file.display()))?;

    if args.dry_run {
        println!("[dry run] {}", summary);
    } else {
        println!("{}", summary);
    }

    if summary.rows_failed > 0 {
        anyhow::bail!("{} of {} rows failed", summary.rows_failed, summary.rows_read);
    }

    Ok(())
}
