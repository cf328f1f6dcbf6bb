use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::core::{money, AppError, Result};
use crate::modules::installments::models::InstallmentStatus;
use crate::modules::reports::models::{InstallmentActivityRow, PortfolioRow};
use crate::modules::reports::repositories::ReportRepository;

/// Builds the servicing reports and renders their CSV form.
///
/// CSV amounts are formatted with exactly two fractional digits; empty
/// cells stand for absent dates.
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    /// Per-contract portfolio summary
    pub async fn portfolio(&self) -> Result<Vec<PortfolioRow>> {
        self.reports.portfolio_rows().await
    }

    pub async fn portfolio_csv(&self) -> Result<String> {
        let rows = self.reports.portfolio_rows().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "contract_id",
            "property_id",
            "buyer_name",
            "sale_type",
            "status",
            "installment_total",
            "installments_paid",
            "installments_pending",
            "amount_paid",
            "balance_remaining",
            "next_due_date",
        ])?;

        for row in &rows {
            writer.write_record([
                row.contract_id.clone(),
                row.property_id.clone(),
                row.buyer_name.clone(),
                row.sale_type.to_string(),
                row.status.to_string(),
                row.installment_total.to_string(),
                row.installments_paid.to_string(),
                row.installments_pending.to_string(),
                money::format(row.amount_paid),
                money::format(row.balance_remaining),
                row.next_due_date.map(|d| d.to_string()).unwrap_or_default(),
            ])?;
        }

        info!(contracts = rows.len(), "Portfolio report rendered");

        finish_csv(writer)
    }

    /// Installments due in the window, oldest first
    pub async fn installment_activity(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        status: Option<InstallmentStatus>,
    ) -> Result<Vec<InstallmentActivityRow>> {
        if from > to {
            return Err(AppError::validation(format!(
                "from ({}) must be on or before to ({})",
                from, to
            )));
        }

        self.reports.installment_activity(from, to, status).await
    }

    pub async fn installment_activity_csv(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        status: Option<InstallmentStatus>,
    ) -> Result<String> {
        let rows = self.installment_activity(from, to, status).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "contract_id",
            "property_id",
            "buyer_name",
            "installment_number",
            "due_date",
            "amount",
            "kind",
            "status",
            "paid_on",
        ])?;

        for row in &rows {
            writer.write_record([
                row.contract_id.clone(),
                row.property_id.clone(),
                row.buyer_name.clone(),
                row.installment_number.to_string(),
                row.due_date.to_string(),
                money::format(row.amount),
                row.kind.to_string(),
                row.status.to_string(),
                row.paid_on.map(|d| d.to_string()).unwrap_or_default(),
            ])?;
        }

        info!(
            installments = rows.len(),
            from = %from,
            to = %to,
            "Installment activity report rendered"
        );

        finish_csv(writer)
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV buffer flush failed: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| AppError::internal(format!("CSV is not UTF-8: {}", e)))
}
