use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{money, AppError, Result};
use crate::modules::installments::models::Installment;
use crate::modules::installments::services::{GenerationOutcome, ScheduleService};

/// Wire shape for a single installment
#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    pub id: String,
    pub installment_number: i32,
    pub due_date: String,
    pub amount: String,
    pub kind: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<String>,
}

impl From<Installment> for InstallmentResponse {
    fn from(installment: Installment) -> Self {
        Self {
            id: installment.id,
            installment_number: installment.installment_number,
            due_date: installment.due_date.to_string(),
            amount: money::format(installment.amount),
            kind: installment.kind.to_string(),
            status: installment.status.to_string(),
            paid_on: installment.paid_on.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub contract_id: String,
    pub installments: Vec<InstallmentResponse>,
}

/// Body for the generate endpoint; the whole body may be omitted
#[derive(Debug, Default, Deserialize)]
pub struct GenerateScheduleRequest {
    /// Cutoff for the paid/pending backfill, today when omitted
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct GenerateScheduleResponse {
    pub contract_id: String,
    pub as_of: String,
    pub installments_created: usize,
    pub installments: Vec<InstallmentResponse>,
}

/// GET /contracts/{contract_id}/installments
pub async fn get_schedule(
    service: web::Data<Arc<ScheduleService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let contract_id = path.into_inner();

    let installments = service.schedule_for(&contract_id).await?;

    Ok(HttpResponse::Ok().json(ScheduleResponse {
        contract_id,
        installments: installments
            .into_iter()
            .map(InstallmentResponse::from)
            .collect(),
    }))
}

/// POST /contracts/{contract_id}/installments/generate
///
/// Generates and stores the contract's schedule. Responds 409 when the
/// schedule already exists and 400 when the contract is not eligible.
pub async fn generate_schedule(
    service: web::Data<Arc<ScheduleService>>,
    path: web::Path<String>,
    request: Option<web::Json<GenerateScheduleRequest>>,
) -> Result<HttpResponse> {
    let contract_id = path.into_inner();
    // callers control the cutoff; the clock is only read here at the edge
    let as_of = request
        .and_then(|r| r.into_inner().as_of)
        .unwrap_or_else(|| Utc::now().date_naive());

    match service.generate_for_contract(&contract_id, as_of).await? {
        GenerationOutcome::Generated(installments) => {
            Ok(HttpResponse::Created().json(GenerateScheduleResponse {
                contract_id,
                as_of: as_of.to_string(),
                installments_created: installments.len(),
                installments: installments
                    .into_iter()
                    .map(InstallmentResponse::from)
                    .collect(),
            }))
        }
        GenerationOutcome::Skipped(reason) if reason.is_already_generated() => {
            Err(AppError::conflict(reason.to_string()))
        }
        GenerationOutcome::Skipped(reason) => Err(AppError::validation(reason.to_string())),
    }
}

// Full-path routes rather than a scope: a scope on /contracts/{contract_id}
// would prefix-capture requests meant for the contracts module.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/contracts/{contract_id}/installments",
        web::get().to(get_schedule),
    )
    .route(
        "/contracts/{contract_id}/installments/generate",
        web::post().to(generate_schedule),
    );
}
