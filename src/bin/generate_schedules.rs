use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use landledger::config::Config;
use landledger::modules::contracts::repositories::MySqlContractRepository;
use landledger::modules::installments::repositories::MySqlInstallmentRepository;
use landledger::modules::installments::services::ScheduleService;

/// Generate installment schedules for every financed, active contract
/// that does not have one yet.
#[derive(Debug, Parser)]
#[command(name = "generate-schedules", version)]
struct Args {
    /// Cutoff for the paid/pending backfill (yyyy-mm-dd), defaults to today
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Report what would be generated without writing anything
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
    let service = ScheduleService::new(contracts, installments);

    let summary = service
        .generate_missing(as_of, args.dry_run)
        .await
        .context("schedule generation batch failed")?;

    if args.dry_run {
        println!("[dry run] {}", summary);
    } else {
        println!("{}", summary);
    }

    Ok(())
}
