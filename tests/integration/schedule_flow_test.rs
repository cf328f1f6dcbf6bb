// End-to-end schedule generation flow against in-memory stores: create
// contracts, generate schedules, rerun the batch, verify the guard.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use landledger::core::{AppError, Result};
use landledger::modules::contracts::models::{
    Contract, ContractStatus, FinancingTerms, NewContract, SaleType,
};
use landledger::modules::contracts::repositories::ContractRepository;
use landledger::modules::contracts::services::ContractService;
use landledger::modules::installments::models::{Installment, InstallmentStatus};
use landledger::modules::installments::repositories::InstallmentRepository;
use landledger::modules::installments::services::{GenerationOutcome, ScheduleService, SkipReason};
use rust_decimal_macros::dec;

#[derive(Default)]
struct InMemoryContracts {
    rows: Mutex<Vec<Contract>>,
}

#[async_trait]
impl ContractRepository for InMemoryContracts {
    async fn insert(&self, contract: &Contract) -> Result<()> {
        self.rows.lock().unwrap().push(contract.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Contract>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list(
        &self,
        status: Option<ContractStatus>,
        sale_type: Option<SaleType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contract>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .filter(|c| sale_type.map_or(true, |s| c.sale_type == s))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_qualifying(&self) -> Result<Vec<Contract>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|c| c.sale_type == SaleType::Cfd && c.status == ContractStatus::Active)
            .cloned()
            .collect())
    }

    async fn update(&self, contract: &Contract) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|c| c.id == contract.id) {
            Some(slot) => {
                *slot = contract.clone();
                Ok(())
            }
            None => Err(AppError::not_found("Contract")),
        }
    }
}

#[derive(Default)]
struct InMemoryInstallments {
    rows: Mutex<HashMap<String, Vec<Installment>>>,
}

#[async_trait]
impl InstallmentRepository for InMemoryInstallments {
    async fn count_for_contract(&self, contract_id: &str) -> Result<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(contract_id)
            .map_or(0, |v| v.len() as i64))
    }

    async fn insert_batch(&self, installments: &[Installment]) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        for installment in installments {
            rows.entry(installment.contract_id.clone())
                .or_default()
                .push(installment.clone());
        }
        Ok(())
    }

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Installment>> {
        let mut found = self
            .rows
            .lock()
            .unwrap()
            .get(contract_id)
            .cloned()
            .unwrap_or_default();
        found.sort_by_key(|i| i.installment_number);
        Ok(found)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Installment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|i| i.id == id)
            .cloned())
    }
}

struct TestContext {
    contracts: Arc<InMemoryContracts>,
    installments: Arc<InMemoryInstallments>,
    contract_service: ContractService,
    schedule_service: ScheduleService,
}

fn setup() -> TestContext {
    let contracts = Arc::new(InMemoryContracts::default());
    let installments = Arc::new(InMemoryInstallments::default());

    TestContext {
        contract_service: ContractService::new(contracts.clone(), installments.clone()),
        schedule_service: ScheduleService::new(contracts.clone(), installments.clone()),
        contracts,
        installments,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn financed_input(property_id: &str) -> NewContract {
    NewContract {
        property_id: property_id.to_string(),
        buyer_name: "Ada Buyer".to_string(),
        buyer_email: None,
        buyer_phone: None,
        sale_type: SaleType::Cfd,
        sale_price: dec!(25000.00),
        installment_amount: Some(dec!(195.00)),
        installment_count: Some(35),
        first_installment_date: Some(date(2025, 5, 25)),
        balloon_amount: None,
        balloon_date: None,
        tax_parcel_number: None,
        annual_property_tax: None,
    }
}

#[tokio::test]
async fn test_generate_then_fetch_schedule() -> Result<()> {
    let ctx = setup();

    let contract = ctx.contract_service.create(financed_input("lot-14")).await?;

    let outcome = ctx
        .schedule_service
        .generate_for_contract(&contract.id, date(2025, 6, 1))
        .await?;

    let generated = match outcome {
        GenerationOutcome::Generated(installments) => installments,
        GenerationOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    };
    assert_eq!(generated.len(), 35);

    let stored = ctx.schedule_service.schedule_for(&contract.id).await?;
    assert_eq!(stored.len(), 35);
    for (i, installment) in stored.iter().enumerate() {
        assert_eq!(installment.installment_number, i as i32 + 1);
    }
    assert_eq!(stored[0].status, InstallmentStatus::Paid);
    assert_eq!(stored[1].status, InstallmentStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn test_second_generation_is_skipped() -> Result<()> {
    let ctx = setup();

    let contract = ctx.contract_service.create(financed_input("lot-14")).await?;

    ctx.schedule_service
        .generate_for_contract(&contract.id, date(2025, 6, 1))
        .await?;

    let outcome = ctx
        .schedule_service
        .generate_for_contract(&contract.id, date(2025, 7, 1))
        .await?;

    match outcome {
        GenerationOutcome::Skipped(SkipReason::AlreadyGenerated { existing }) => {
            assert_eq!(existing, 35);
        }
        other => panic!("expected already-generated skip, got {:?}", other),
    }

    // the rerun must not have touched the stored schedule
    assert_eq!(ctx.installments.count_for_contract(&contract.id).await?, 35);

    Ok(())
}

#[tokio::test]
async fn test_batch_generates_only_missing_schedules() -> Result<()> {
    let ctx = setup();

    let ready = ctx.contract_service.create(financed_input("lot-1")).await?;

    let covered = ctx.contract_service.create(financed_input("lot-2")).await?;
    ctx.schedule_service
        .generate_for_contract(&covered.id, date(2025, 6, 1))
        .await?;

    let mut no_date = financed_input("lot-3");
    no_date.first_installment_date = None;
    ctx.contract_service.create(no_date).await?;

    // cash sales never qualify, so the batch should not even see this one
    let mut cash = financed_input("lot-4");
    cash.sale_type = SaleType::Cash;
    cash.installment_amount = None;
    cash.installment_count = None;
    cash.first_installment_date = None;
    ctx.contract_service.create(cash).await?;

    let summary = ctx
        .schedule_service
        .generate_missing(date(2025, 6, 1), false)
        .await?;

    assert_eq!(summary.contracts_seen, 3);
    assert_eq!(summary.schedules_generated, 1);
    assert_eq!(summary.installments_created, 35);
    assert_eq!(summary.skipped_existing, 1);
    assert_eq!(summary.skipped_ineligible, 1);

    assert_eq!(ctx.installments.count_for_contract(&ready.id).await?, 35);

    Ok(())
}

#[tokio::test]
async fn test_batch_dry_run_persists_nothing() -> Result<()> {
    let ctx = setup();

    let contract = ctx.contract_service.create(financed_input("lot-14")).await?;

    let summary = ctx
        .schedule_service
        .generate_missing(date(2025, 6, 1), true)
        .await?;

    assert_eq!(summary.schedules_generated, 1);
    assert_eq!(summary.installments_created, 35);
    assert_eq!(ctx.installments.count_for_contract(&contract.id).await?, 0);

    // a later real run still generates
    let summary = ctx
        .schedule_service
        .generate_missing(date(2025, 6, 1), false)
        .await?;
    assert_eq!(summary.schedules_generated, 1);
    assert_eq!(ctx.installments.count_for_contract(&contract.id).await?, 35);

    Ok(())
}

#[tokio::test]
async fn test_unknown_contract_is_not_found() {
    let ctx = setup();

    let err = ctx
        .schedule_service
        .generate_for_contract("no-such-contract", date(2025, 6, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));

    let err = ctx
        .schedule_service
        .schedule_for("no-such-contract")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_terms_lock_after_generation() -> Result<()> {
    let ctx = setup();

    let contract = ctx.contract_service.create(financed_input("lot-14")).await?;

    let new_terms = FinancingTerms {
        installment_amount: dec!(210.00),
        installment_count: 30,
        first_installment_date: Some(date(2025, 7, 1)),
        balloon_amount: None,
        balloon_date: None,
    };

    // editable while no installments exist
    let updated = ctx
        .contract_service
        .update_terms(&contract.id, new_terms.clone())
        .await?;
    assert_eq!(updated.installment_count, 30);

    ctx.schedule_service
        .generate_for_contract(&contract.id, date(2025, 6, 1))
        .await?;

    let err = ctx
        .contract_service
        .update_terms(&contract.id, new_terms)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn test_cancelled_contract_is_ineligible() -> Result<()> {
    let ctx = setup();

    let contract = ctx.contract_service.create(financed_input("lot-14")).await?;
    ctx.contract_service.cancel(&contract.id).await?;

    let outcome = ctx
        .schedule_service
        .generate_for_contract(&contract.id, date(2025, 6, 1))
        .await?;

    assert!(matches!(
        outcome,
        GenerationOutcome::Skipped(SkipReason::InactiveContract)
    ));
    assert_eq!(ctx.contracts.rows.lock().unwrap().len(), 1);

    Ok(())
}
