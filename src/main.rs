use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use landledger::config::Config;
use landledger::middleware::RequestId;
use landledger::modules::contracts::repositories::MySqlContractRepository;
use landledger::modules::contracts::services::ContractService;
use landledger::modules::installments::repositories::MySqlInstallmentRepository;
use landledger::modules::installments::services::ScheduleService;
use landledger::modules::payments::repositories::MySqlPaymentRepository;
use landledger::modules::payments::services::PaymentService;
use landledger::modules::reports::repositories::MySqlReportRepository;
use landledger::modules::reports::services::ReportService;
use landledger::modules::{contracts, health, installments, payments, reports};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landledger=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting Landledger Contract Servicing Platform");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    let contract_repo = Arc::new(MySqlContractRepository::new(db_pool.clone()));
    let installment_repo = Arc::new(MySqlInstallmentRepository::new(db_pool.clone()));
    let payment_repo = Arc::new(MySqlPaymentRepository::new(db_pool.clone()));
    let report_repo = Arc::new(MySqlReportRepository::new(db_pool.clone()));

    let contract_service = Arc::new(ContractService::new(
        contract_repo.clone(),
        installment_repo.clone(),
    ));
    let schedule_service = Arc::new(ScheduleService::new(
        contract_repo.clone(),
        installment_repo.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        payment_repo,
        installment_repo,
        contract_repo,
    ));
    let report_service = Arc::new(ReportService::new(report_repo));

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let workers = config.server.workers;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestId)
            .wrap(Cors::permissive())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(contract_service.clone()))
            .app_data(web::Data::new(schedule_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .configure(health::controllers::configure)
            // nested /contracts/{id}/... resources must register before the
            // /contracts scope, which prefix-captures everything beneath it
            .configure(installments::controllers::configure)
            .configure(payments::controllers::configure)
            .configure(reports::controllers::configure)
            .configure(contracts::controllers::configure)
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}
