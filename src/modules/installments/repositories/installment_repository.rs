use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::Result;
use crate::modules::installments::models::Installment;

/// Persistence operations for installment schedules.
///
/// `count_for_contract` is the idempotency surface: a non-zero count means
/// the contract's schedule exists and generation must not run again.
#[async_trait]
pub trait InstallmentRepository: Send + Sync {
    async fn count_for_contract(&self, contract_id: &str) -> Result<i64>;

    /// Insert a generated schedule in a single transaction, so a failure
    /// partway through leaves no partial schedule behind.
    async fn insert_batch(&self, installments: &[Installment]) -> Result<()>;

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Installment>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Installment>>;
}

const INSTALLMENT_COLUMNS: &str = "\
    id, contract_id, property_id, installment_number, due_date, amount, \
    kind, status, paid_on, created_at, updated_at";

/// MySQL-backed installment repository
pub struct MySqlInstallmentRepository {
    pool: MySqlPool,
}

impl MySqlInstallmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstallmentRepository for MySqlInstallmentRepository {
    async fn count_for_contract(&self, contract_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM installments WHERE contract_id = ?")
                .bind(contract_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn insert_batch(&self, installments: &[Installment]) -> Result<()> {
        if installments.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for installment in installments {
            sqlx::query(
                r#"
                INSERT INTO installments (
                    id, contract_id, property_id, installment_number,
                    due_date, amount, kind, status, paid_on,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&installment.id)
            .bind(&installment.contract_id)
            .bind(&installment.property_id)
            .bind(installment.installment_number)
            .bind(installment.due_date)
            .bind(installment.amount)
            .bind(installment.kind.as_str())
            .bind(installment.status.as_str())
            .bind(installment.paid_on)
            .bind(installment.created_at)
            .bind(installment.updated_at)
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Installment>> {
        let sql = format!(
            "SELECT {} FROM installments WHERE contract_id = ? ORDER BY installment_number",
            INSTALLMENT_COLUMNS
        );

        let installments = sqlx::query_as::<_, Installment>(&sql)
            .bind(contract_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(installments)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Installment>> {
        let sql = format!(
            "SELECT {} FROM installments WHERE id = ?",
            INSTALLMENT_COLUMNS
        );

        let installment = sqlx::query_as::<_, Installment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(installment)
    }
}
