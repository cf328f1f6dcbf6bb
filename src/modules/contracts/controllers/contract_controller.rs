use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::Result;
use crate::modules::contracts::models::{ContractStatus, FinancingTerms, NewContract, SaleType};
use crate::modules::contracts::services::ContractService;

#[derive(Debug, Deserialize)]
pub struct ListContractsQuery {
    #[serde(default)]
    pub status: Option<ContractStatus>,
    #[serde(default)]
    pub sale_type: Option<SaleType>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct RecordDeedRequest {
    pub recorded_on: NaiveDate,
    pub instrument_number: String,
}

#[derive(Debug, Deserialize)]
pub struct TaxFieldsRequest {
    #[serde(default)]
    pub tax_parcel_number: Option<String>,
    #[serde(default)]
    pub annual_property_tax: Option<Decimal>,
}

/// POST /contracts
pub async fn create_contract(
    service: web::Data<Arc<ContractService>>,
    request: web::Json<NewContract>,
) -> Result<HttpResponse> {
    let contract = service.create(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(contract))
}

/// GET /contracts
pub async fn list_contracts(
    service: web::Data<Arc<ContractService>>,
    query: web::Query<ListContractsQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();

    let contracts = service
        .list(query.status, query.sale_type, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(contracts))
}

/// GET /contracts/{id}
pub async fn get_contract(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    let contract = service.get(&id).await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// PATCH /contracts/{id}/terms
pub async fn update_terms(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
    request: web::Json<FinancingTerms>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    let contract = service.update_terms(&id, request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// POST /contracts/{id}/deed
pub async fn record_deed(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
    request: web::Json<RecordDeedRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let request = request.into_inner();

    let contract = service
        .record_deed(&id, request.recorded_on, request.instrument_number)
        .await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// PATCH /contracts/{id}/tax
pub async fn update_tax_fields(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
    request: web::Json<TaxFieldsRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let request = request.into_inner();

    let contract = service
        .update_tax_fields(&id, request.tax_parcel_number, request.annual_property_tax)
        .await?;

    Ok(HttpResponse::Ok().json(contract))
}

/// POST /contracts/{id}/cancel
pub async fn cancel_contract(
    service: web::Data<Arc<ContractService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    let contract = service.cancel(&id).await?;

    Ok(HttpResponse::Ok().json(contract))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contracts")
            .route("", web::post().to(create_contract))
            .route("", web::get().to(list_contracts))
            .route("/{id}", web::get().to(get_contract))
            .route("/{id}/terms", web::patch().to(update_terms))
            .route("/{id}/deed", web::post().to(record_deed))
            .route("/{id}/tax", web::patch().to(update_tax_fields))
            .route("/{id}/cancel", web::post().to(cancel_contract)),
    );
}
