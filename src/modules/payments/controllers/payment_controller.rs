use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::Result;
use crate::modules::payments::models::NewPayment;
use crate::modules::payments::services::PaymentService;

/// POST /payments
pub async fn record_payment(
    service: web::Data<Arc<PaymentService>>,
    request: web::Json<NewPayment>,
) -> Result<HttpResponse> {
    let payment = service.record(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(payment))
}

/// GET /contracts/{contract_id}/payments
pub async fn list_contract_payments(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let contract_id = path.into_inner();

    let payments = service.list_for_contract(&contract_id).await?;

    Ok(HttpResponse::Ok().json(payments))
}

/// GET /installments/{installment_id}/payments
pub async fn list_installment_payments(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let installment_id = path.into_inner();

    let payments = service.list_for_installment(&installment_id).await?;

    Ok(HttpResponse::Ok().json(payments))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/payments", web::post().to(record_payment))
        .route(
            "/contracts/{contract_id}/payments",
            web::get().to(list_contract_payments),
        )
        .route(
            "/installments/{installment_id}/payments",
            web::get().to(list_installment_payments),
        );
}
