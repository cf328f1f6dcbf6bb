use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::contracts::models::Contract;
use crate::modules::contracts::repositories::ContractRepository;
use crate::modules::installments::models::Installment;
use crate::modules::installments::repositories::InstallmentRepository;
use super::schedule_generator::{ScheduleGenerator, SkipReason};

/// What happened to one contract in the generation flow
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Schedule was produced, and persisted unless the run was a dry run
    Generated(Vec<Installment>),
    /// Contract was passed over
    Skipped(SkipReason),
}

/// Counters reported by a batch generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub contracts_seen: usize,
    pub schedules_generated: usize,
    pub installments_created: usize,
    pub skipped_existing: usize,
    pub skipped_ineligible: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} contracts seen: {} schedules generated ({} installments), \
             {} already had schedules, {} ineligible",
            self.contracts_seen,
            self.schedules_generated,
            self.installments_created,
            self.skipped_existing,
            self.skipped_ineligible
        )
    }
}

/// Orchestrates schedule generation: the already-generated guard, the
/// eligibility check, generation itself, and persistence.
pub struct ScheduleService {
    contracts: Arc<dyn ContractRepository>,
    installments: Arc<dyn InstallmentRepository>,
}

impl ScheduleService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        installments: Arc<dyn InstallmentRepository>,
    ) -> Self {
        Self {
            contracts,
            installments,
        }
    }

    /// Stored schedule for one contract, ordered by installment number.
    /// Unknown contract ids surface as not-found rather than an empty list.
    pub async fn schedule_for(&self, contract_id: &str) -> Result<Vec<Installment>> {
        self.load_contract(contract_id).await?;
        self.installments.find_by_contract(contract_id).await
    }

    /// Single-contract entry point used by the HTTP API and the importer
    pub async fn generate_for_contract(
        &self,
        contract_id: &str,
        as_of: NaiveDate,
    ) -> Result<GenerationOutcome> {
        let contract = self.load_contract(contract_id).await?;
        self.run_generation(&contract, as_of, false).await
    }

    /// Batch entry point: every financed, active contract without a
    /// schedule gets one. Skips are logged and counted; database errors
    /// abort the run.
    pub async fn generate_missing(&self, as_of: NaiveDate, dry_run: bool) -> Result<BatchSummary> {
        let contracts = self.contracts.find_qualifying().await?;

        let mut summary = BatchSummary::default();

        for contract in &contracts {
            summary.contracts_seen += 1;

            match self.run_generation(contract, as_of, dry_run).await? {
                GenerationOutcome::Generated(schedule) => {
                    summary.schedules_generated += 1;
                    summary.installments_created += schedule.len();
                }
                GenerationOutcome::Skipped(reason) if reason.is_already_generated() => {
                    summary.skipped_existing += 1;
                }
                GenerationOutcome::Skipped(_) => {
                    summary.skipped_ineligible += 1;
                }
            }
        }

        info!(
            contracts_seen = summary.contracts_seen,
            schedules_generated = summary.schedules_generated,
            installments_created = summary.installments_created,
            skipped_existing = summary.skipped_existing,
            skipped_ineligible = summary.skipped_ineligible,
            dry_run,
            "Schedule generation batch finished"
        );

        Ok(summary)
    }

    async fn run_generation(
        &self,
        contract: &Contract,
        as_of: NaiveDate,
        dry_run: bool,
    ) -> Result<GenerationOutcome> {
        // the guard comes before eligibility so a contract whose terms
        // were edited after generation still reports the existing schedule
        let existing = self.installments.count_for_contract(&contract.id).await?;
        if existing > 0 {
            info!(
                contract_id = %contract.id,
                existing,
                "Skipping generation, schedule already exists"
            );
            return Ok(GenerationOutcome::Skipped(SkipReason::AlreadyGenerated {
                existing,
            }));
        }

        if let Some(reason) = ScheduleGenerator::eligibility(contract) {
            info!(
                contract_id = %contract.id,
                reason = %reason,
                "Skipping generation, contract not eligible"
            );
            return Ok(GenerationOutcome::Skipped(reason));
        }

        let schedule = ScheduleGenerator::generate(contract, as_of)?;

        if !dry_run {
            self.installments.insert_batch(&schedule).await?;
        }

        info!(
            contract_id = %contract.id,
            installments = schedule.len(),
            as_of = %as_of,
            dry_run,
            "Installment schedule generated"
        );

        Ok(GenerationOutcome::Generated(schedule))
    }

    async fn load_contract(&self, contract_id: &str) -> Result<Contract> {
        self.contracts
            .find_by_id(contract_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contract {}", contract_id)))
    }
}
