use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::contracts::models::{
    Contract, ContractStatus, FinancingTerms, NewContract, SaleType,
};
use crate::modules::contracts::repositories::ContractRepository;
use crate::modules::installments::repositories::InstallmentRepository;

/// Business logic for contract servicing
pub struct ContractService {
    contracts: Arc<dyn ContractRepository>,
    installments: Arc<dyn InstallmentRepository>,
}

impl ContractService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        installments: Arc<dyn InstallmentRepository>,
    ) -> Self {
        Self {
            contracts,
            installments,
        }
    }

    /// Create a new contract
    pub async fn create(&self, input: NewContract) -> Result<Contract> {
        let contract = Contract::new(input)?;

        self.contracts.insert(&contract).await?;

        info!(
            contract_id = %contract.id,
            property_id = %contract.property_id,
            buyer = %contract.buyer_name,
            sale_type = %contract.sale_type,
            "Contract created"
        );

        Ok(contract)
    }

    /// Fetch a contract by id
    pub async fn get(&self, id: &str) -> Result<Contract> {
        self.contracts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contract {}", id)))
    }

    /// List contracts, optionally filtered by status and sale type
    pub async fn list(
        &self,
        status: Option<ContractStatus>,
        sale_type: Option<SaleType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contract>> {
        self.contracts.list(status, sale_type, limit, offset).await
    }

    /// Replace the financing terms. Locked once installments exist, since
    /// the stored schedule would no longer match the terms.
    pub async fn update_terms(&self, id: &str, terms: FinancingTerms) -> Result<Contract> {
        let mut contract = self.get(id).await?;

        let existing = self.installments.count_for_contract(id).await?;
        if existing > 0 {
            return Err(AppError::conflict(format!(
                "financing terms are locked: {} installments already generated",
                existing
            )));
        }

        contract.set_terms(terms)?;
        self.contracts.update(&contract).await?;

        info!(contract_id = %contract.id, "Financing terms updated");

        Ok(contract)
    }

    /// Record the deed, transferring title to the buyer
    pub async fn record_deed(
        &self,
        id: &str,
        recorded_on: NaiveDate,
        instrument_number: String,
    ) -> Result<Contract> {
        let mut contract = self.get(id).await?;

        contract.record_deed(recorded_on, instrument_number)?;
        self.contracts.update(&contract).await?;

        info!(
            contract_id = %contract.id,
            recorded_on = %recorded_on,
            "Deed recorded"
        );

        Ok(contract)
    }

    /// Update the tax-audit fields
    pub async fn update_tax_fields(
        &self,
        id: &str,
        tax_parcel_number: Option<String>,
        annual_property_tax: Option<Decimal>,
    ) -> Result<Contract> {
        let mut contract = self.get(id).await?;

        contract.set_tax_fields(tax_parcel_number, annual_property_tax)?;
        self.contracts.update(&contract).await?;

        info!(contract_id = %contract.id, "Tax fields updated");

        Ok(contract)
    }

    /// Cancel an active contract
    pub async fn cancel(&self, id: &str) -> Result<Contract> {
        let mut contract = self.get(id).await?;

        contract.cancel()?;
        self.contracts.update(&contract).await?;

        info!(contract_id = %contract.id, "Contract cancelled");

        Ok(contract)
    }
}
