use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::modules::installments::models::InstallmentStatus;
use crate::modules::reports::models::PortfolioRow;
use crate::modules::reports::services::ReportService;

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub contracts: Vec<PortfolioRow>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub status: Option<InstallmentStatus>,
}

/// GET /reports/portfolio
pub async fn portfolio(service: web::Data<Arc<ReportService>>) -> Result<HttpResponse> {
    let contracts = service.portfolio().await?;

    Ok(HttpResponse::Ok().json(PortfolioResponse { contracts }))
}

/// GET /reports/portfolio.csv
pub async fn portfolio_csv(service: web::Data<Arc<ReportService>>) -> Result<HttpResponse> {
    let body = service.portfolio_csv().await?;

    Ok(csv_response("portfolio.csv", body))
}

/// GET /reports/installments.csv?from=..&to=..&status=..
pub async fn installment_activity_csv(
    service: web::Data<Arc<ReportService>>,
    query: web::Query<ActivityQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();

    let body = service
        .installment_activity_csv(query.from, query.to, query.status)
        .await?;

    Ok(csv_response("installments.csv", body))
}

fn csv_response(filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/portfolio", web::get().to(portfolio))
            .route("/portfolio.csv", web::get().to(portfolio_csv))
            .route("/installments.csv", web::get().to(installment_activity_csv)),
    );
}
