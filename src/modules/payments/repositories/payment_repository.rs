use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::installments::models::{Installment, InstallmentStatus};
use crate::modules::payments::models::Payment;

/// Persistence operations for received payments. Rows are append-only.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a payment and the installment it settles in one transaction.
    /// Implementations re-check the stored installment status under lock and
    /// return a conflict if it is already paid.
    async fn apply(&self, payment: &Payment, installment: &Installment) -> Result<()>;

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Payment>>;

    async fn find_by_installment(&self, installment_id: &str) -> Result<Vec<Payment>>;
}

const PAYMENT_COLUMNS: &str = "\
    id, contract_id, installment_id, amount, method, external_ref, \
    received_on, note, created_at";

/// MySQL-backed payment repository
pub struct MySqlPaymentRepository {
    pool: MySqlPool,
}

impl MySqlPaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for MySqlPaymentRepository {
    async fn apply(&self, payment: &Payment, installment: &Installment) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Lock the installment row (FOR UPDATE) until commit
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM installments WHERE id = ? FOR UPDATE")
                .bind(&installment.id)
                .fetch_optional(tx.as_mut())
                .await?;

        // Re-check under the lock; a concurrent payment may have won
        let status = status
            .ok_or_else(|| AppError::not_found(format!("Installment {}", installment.id)))?;
        if status == InstallmentStatus::Paid.as_str() {
            return Err(AppError::conflict(format!(
                "installment {} is already paid",
                installment.installment_number
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, contract_id, installment_id, amount, method,
                external_ref, received_on, note, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.contract_id)
        .bind(&payment.installment_id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(&payment.external_ref)
        .bind(payment.received_on)
        .bind(&payment.note)
        .bind(payment.created_at)
        .execute(tx.as_mut())
        .await?;

        sqlx::query(
            r#"
            UPDATE installments
            SET status = ?, paid_on = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(installment.status.as_str())
        .bind(installment.paid_on)
        .bind(installment.updated_at)
        .bind(&installment.id)
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE contract_id = ? ORDER BY received_on, created_at",
            PAYMENT_COLUMNS
        );

        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(contract_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }

    async fn find_by_installment(&self, installment_id: &str) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE installment_id = ? ORDER BY received_on, created_at",
            PAYMENT_COLUMNS
        );

        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(installment_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }
}
