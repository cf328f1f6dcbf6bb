use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::core::Result;
use crate::modules::installments::models::InstallmentStatus;
use crate::modules::reports::models::{InstallmentActivityRow, PortfolioRow};

/// Aggregation queries behind the servicing reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn portfolio_rows(&self) -> Result<Vec<PortfolioRow>>;

    async fn installment_activity(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        status: Option<InstallmentStatus>,
    ) -> Result<Vec<InstallmentActivityRow>>;
}

/// MySQL-backed report repository
pub struct MySqlReportRepository {
    pool: MySqlPool,
}

impl MySqlReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for MySqlReportRepository {
    async fn portfolio_rows(&self) -> Result<Vec<PortfolioRow>> {
        let rows = sqlx::query_as::<_, PortfolioRow>(
            r#"
            SELECT
                c.id AS contract_id,
                c.property_id,
                c.buyer_name,
                c.sale_type,
                c.status,
                COUNT(i.id) AS installment_total,
                CAST(COALESCE(SUM(CASE WHEN i.status = 'paid' THEN 1 ELSE 0 END), 0) AS SIGNED)
                    AS installments_paid,
                CAST(COALESCE(SUM(CASE WHEN i.status = 'pending' THEN 1 ELSE 0 END), 0) AS SIGNED)
                    AS installments_pending,
                CAST(COALESCE(SUM(CASE WHEN i.status = 'paid' THEN i.amount END), 0) AS DECIMAL(13, 2))
                    AS amount_paid,
                CAST(COALESCE(SUM(CASE WHEN i.status = 'pending' THEN i.amount END), 0) AS DECIMAL(13, 2))
                    AS balance_remaining,
                MIN(CASE WHEN i.status = 'pending' THEN i.due_date END) AS next_due_date
            FROM contracts c
            LEFT JOIN installments i ON i.contract_id = c.id
            GROUP BY c.id, c.property_id, c.buyer_name, c.sale_type, c.status, c.created_at
            ORDER BY c.created_at, c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn installment_activity(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        status: Option<InstallmentStatus>,
    ) -> Result<Vec<InstallmentActivityRow>> {
        let mut sql = String::from(
            "SELECT i.contract_id, i.property_id, c.buyer_name, i.installment_number, \
             i.due_date, i.amount, i.kind, i.status, i.paid_on \
             FROM installments i \
             JOIN contracts c ON c.id = i.contract_id \
             WHERE i.due_date BETWEEN ? AND ?",
        );

        if status.is_some() {
            sql.push_str(" AND i.status = ?");
        }

        sql.push_str(" ORDER BY i.due_date, i.contract_id, i.installment_number");

        let mut query = sqlx::query_as::<_, InstallmentActivityRow>(&sql)
            .bind(from)
            .bind(to);

        if let Some(status) = status {
            query = query.bind(status.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows)
    }
}
