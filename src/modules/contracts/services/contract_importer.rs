use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::{AppError, Result};
use crate::modules::contracts::models::{Contract, ContractStatus, NewContract, SaleType};
use crate::modules::contracts::repositories::ContractRepository;
use crate::modules::installments::services::{GenerationOutcome, ScheduleService};

/// One row of the spreadsheet hand-off format. Empty cells deserialize
/// as `None`; `status` lets legacy books arrive already paid off or
/// cancelled.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractRow {
    pub property_id: String,
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_email: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
    pub sale_type: String,
    #[serde(default)]
    pub status: Option<String>,
    pub sale_price: Decimal,
    #[serde(default)]
    pub installment_amount: Option<Decimal>,
    #[serde(default)]
    pub installment_count: Option<i32>,
    #[serde(default)]
    pub first_installment_date: Option<NaiveDate>,
    #[serde(default)]
    pub balloon_amount: Option<Decimal>,
    #[serde(default)]
    pub balloon_date: Option<NaiveDate>,
    #[serde(default)]
    pub tax_parcel_number: Option<String>,
    #[serde(default)]
    pub annual_property_tax: Option<Decimal>,
}

impl ContractRow {
    /// Validate the row and build the contract it describes
    pub fn into_contract(self) -> Result<Contract> {
        let sale_type = SaleType::try_from(self.sale_type).map_err(AppError::Validation)?;

        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(value) => {
                Some(ContractStatus::try_from(value.to_string()).map_err(AppError::Validation)?)
            }
        };

        let mut contract = Contract::new(NewContract {
            property_id: self.property_id,
            buyer_name: self.buyer_name,
            buyer_email: self.buyer_email.filter(|v| !v.is_empty()),
            buyer_phone: self.buyer_phone.filter(|v| !v.is_empty()),
            sale_type,
            sale_price: self.sale_price,
            installment_amount: self.installment_amount,
            installment_count: self.installment_count,
            first_installment_date: self.first_installment_date,
            balloon_amount: self.balloon_amount,
            balloon_date: self.balloon_date,
            tax_parcel_number: self.tax_parcel_number.filter(|v| !v.is_empty()),
            annual_property_tax: self.annual_property_tax,
        })?;

        if let Some(status) = status {
            contract.status = status;
        }

        Ok(contract)
    }
}

/// Counters reported by an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub contracts_imported: usize,
    pub installments_created: usize,
    pub rows_failed: usize,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows read: {} contracts imported ({} installments), {} rows failed",
            self.rows_read, self.contracts_imported, self.installments_created, self.rows_failed
        )
    }
}

/// Loads spreadsheet exports as contracts, generating each imported
/// contract's installment schedule through the shared generation flow.
pub struct ContractImporter {
    contracts: Arc<dyn ContractRepository>,
    schedules: Arc<ScheduleService>,
}

impl ContractImporter {
    pub fn new(contracts: Arc<dyn ContractRepository>, schedules: Arc<ScheduleService>) -> Self {
        Self {
            contracts,
            schedules,
        }
    }

    pub async fn import_path(
        &self,
        path: &Path,
        as_of: NaiveDate,
        dry_run: bool,
    ) -> Result<ImportSummary> {
        let file = std::fs::File::open(path)
            .map_err(|e| AppError::validation(format!("cannot open {}: {}", path.display(), e)))?;

        self.import_reader(file, as_of, dry_run).await
    }

    /// Row-level failures are logged with their line number and skipped;
    /// database failures abort the run.
    pub async fn import_reader<R: Read>(
        &self,
        reader: R,
        as_of: NaiveDate,
        dry_run: bool,
    ) -> Result<ImportSummary> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut summary = ImportSummary::default();

        for (index, record) in csv_reader.deserialize::<ContractRow>().enumerate() {
            // line 1 is the header row
            let line = index + 2;
            summary.rows_read += 1;

            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    warn!(line, error = %e, "Skipping malformed row");
                    summary.rows_failed += 1;
                    continue;
                }
            };

            match self.import_row(row, as_of, dry_run).await {
                Ok(installments) => {
                    summary.contracts_imported += 1;
                    summary.installments_created += installments;
                }
                Err(AppError::Database(e)) => return Err(AppError::Database(e)),
                Err(e) => {
                    warn!(line, error = %e, "Skipping rejected row");
                    summary.rows_failed += 1;
                }
            }
        }

        info!(
            rows_read = summary.rows_read,
            contracts_imported = summary.contracts_imported,
            installments_created = summary.installments_created,
            rows_failed = summary.rows_failed,
            dry_run,
            "Contract import finished"
        );

        Ok(summary)
    }

    async fn import_row(&self, row: ContractRow, as_of: NaiveDate, dry_run: bool) -> Result<usize> {
        let contract = row.into_contract()?;

        if dry_run {
            return Ok(0);
        }

        self.contracts.insert(&contract).await?;

        info!(
            contract_id = %contract.id,
            property_id = %contract.property_id,
            buyer = %contract.buyer_name,
            "Contract imported"
        );

        match self
            .schedules
            .generate_for_contract(&contract.id, as_of)
            .await?
        {
            GenerationOutcome::Generated(schedule) => Ok(schedule.len()),
            GenerationOutcome::Skipped(reason) => {
                info!(
                    contract_id = %contract.id,
                    reason = %reason,
                    "Imported without a schedule"
                );
                Ok(0)
            }
        }
    }
}
