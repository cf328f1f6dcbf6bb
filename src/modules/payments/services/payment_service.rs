use std::sync::Arc;

use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::contracts::models::ContractStatus;
use crate::modules::contracts::repositories::ContractRepository;
use crate::modules::installments::models::InstallmentStatus;
use crate::modules::installments::repositories::InstallmentRepository;
use crate::modules::payments::models::{NewPayment, Payment};
use crate::modules::payments::repositories::PaymentRepository;

/// Applies received payments to installments and rolls the contract
/// forward when its schedule completes.
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    installments: Arc<dyn InstallmentRepository>,
    contracts: Arc<dyn ContractRepository>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        installments: Arc<dyn InstallmentRepository>,
        contracts: Arc<dyn ContractRepository>,
    ) -> Self {
        Self {
            payments,
            installments,
            contracts,
        }
    }

    /// Record a payment against an installment. The installment moves to
    /// paid with the received date; paying the last open installment marks
    /// the contract paid off.
    pub async fn record(&self, input: NewPayment) -> Result<Payment> {
        let payment = Payment::new(input)?;

        let mut installment = self
            .installments
            .find_by_id(&payment.installment_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Installment {}", payment.installment_id))
            })?;

        if installment.contract_id != payment.contract_id {
            return Err(AppError::validation(format!(
                "installment {} does not belong to contract {}",
                payment.installment_id, payment.contract_id
            )));
        }

        installment.mark_paid(payment.received_on)?;

        self.payments.apply(&payment, &installment).await?;

        info!(
            payment_id = %payment.id,
            contract_id = %payment.contract_id,
            installment_number = installment.installment_number,
            amount = %payment.amount,
            method = %payment.method,
            "Payment recorded"
        );

        self.settle_contract_if_complete(&payment.contract_id)
            .await?;

        Ok(payment)
    }

    pub async fn list_for_contract(&self, contract_id: &str) -> Result<Vec<Payment>> {
        self.payments.find_by_contract(contract_id).await
    }

    pub async fn list_for_installment(&self, installment_id: &str) -> Result<Vec<Payment>> {
        self.payments.find_by_installment(installment_id).await
    }

    /// A contract is settled once every installment on its schedule is paid
    async fn settle_contract_if_complete(&self, contract_id: &str) -> Result<()> {
        let installments = self.installments.find_by_contract(contract_id).await?;

        let all_paid = !installments.is_empty()
            && installments
                .iter()
                .all(|i| i.status == InstallmentStatus::Paid);

        if !all_paid {
            return Ok(());
        }

        let mut contract = self
            .contracts
            .find_by_id(contract_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contract {}", contract_id)))?;

        // Only an active contract rolls to paid off. A cancelled or
        // defaulted contract keeps its status even if late payments land.
        if contract.status != ContractStatus::Active {
            return Ok(());
        }

        contract.mark_paid_off()?;
        self.contracts.update(&contract).await?;

        info!(contract_id = %contract.id, "Contract paid off");

        Ok(())
    }
}
