use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::contracts::models::{Contract, ContractStatus, SaleType};

/// Persistence operations for contracts.
///
/// The schedule generator consumes this as its contract source; the batch
/// runner relies on `find_qualifying` to enumerate financed, active
/// contracts.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    async fn insert(&self, contract: &Contract) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Contract>>;

    async fn list(
        &self,
        status: Option<ContractStatus>,
        sale_type: Option<SaleType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contract>>;

    /// Contracts that participate in schedule generation: seller-financed
    /// and still active.
    async fn find_qualifying(&self) -> Result<Vec<Contract>>;

    async fn update(&self, contract: &Contract) -> Result<()>;
}

const CONTRACT_COLUMNS: &str = "\
    id, property_id, buyer_name, buyer_email, buyer_phone, sale_type, status, \
    sale_price, installment_amount, installment_count, first_installment_date, \
    balloon_amount, balloon_date, deed_status, deed_recorded_on, \
    deed_instrument_number, tax_parcel_number, annual_property_tax, \
    created_at, updated_at";

/// MySQL-backed contract repository
pub struct MySqlContractRepository {
    pool: MySqlPool,
}

impl MySqlContractRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContractRepository for MySqlContractRepository {
    async fn insert(&self, contract: &Contract) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contracts (
                id, property_id, buyer_name, buyer_email, buyer_phone,
                sale_type, status, sale_price, installment_amount,
                installment_count, first_installment_date, balloon_amount,
                balloon_date, deed_status, deed_recorded_on,
                deed_instrument_number, tax_parcel_number, annual_property_tax,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contract.id)
        .bind(&contract.property_id)
        .bind(&contract.buyer_name)
        .bind(&contract.buyer_email)
        .bind(&contract.buyer_phone)
        .bind(contract.sale_type.as_str())
        .bind(contract.status.as_str())
        .bind(contract.sale_price)
        .bind(contract.installment_amount)
        .bind(contract.installment_count)
        .bind(contract.first_installment_date)
        .bind(contract.balloon_amount)
        .bind(contract.balloon_date)
        .bind(contract.deed_status.as_str())
        .bind(contract.deed_recorded_on)
        .bind(&contract.deed_instrument_number)
        .bind(&contract.tax_parcel_number)
        .bind(contract.annual_property_tax)
        .bind(contract.created_at)
        .bind(contract.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Contract>> {
        let sql = format!("SELECT {} FROM contracts WHERE id = ?", CONTRACT_COLUMNS);

        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contract)
    }

    async fn list(
        &self,
        status: Option<ContractStatus>,
        sale_type: Option<SaleType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contract>> {
        let limit = limit.clamp(1, 100);
        let offset = offset.max(0);

        let mut sql = format!("SELECT {} FROM contracts WHERE 1 = 1", CONTRACT_COLUMNS);
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if sale_type.is_some() {
            sql.push_str(" AND sale_type = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Contract>(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        if let Some(sale_type) = sale_type {
            query = query.bind(sale_type.as_str());
        }

        let contracts = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(contracts)
    }

    async fn find_qualifying(&self) -> Result<Vec<Contract>> {
        let sql = format!(
            "SELECT {} FROM contracts \
             WHERE sale_type = 'cfd' AND status = 'active' \
             ORDER BY created_at, id",
            CONTRACT_COLUMNS
        );

        let contracts = sqlx::query_as::<_, Contract>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(contracts)
    }

    async fn update(&self, contract: &Contract) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE contracts
            SET
                buyer_name = ?,
                buyer_email = ?,
                buyer_phone = ?,
                status = ?,
                installment_amount = ?,
                installment_count = ?,
                first_installment_date = ?,
                balloon_amount = ?,
                balloon_date = ?,
                deed_status = ?,
                deed_recorded_on = ?,
                deed_instrument_number = ?,
                tax_parcel_number = ?,
                annual_property_tax = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&contract.buyer_name)
        .bind(&contract.buyer_email)
        .bind(&contract.buyer_phone)
        .bind(contract.status.as_str())
        .bind(contract.installment_amount)
        .bind(contract.installment_count)
        .bind(contract.first_installment_date)
        .bind(contract.balloon_amount)
        .bind(contract.balloon_date)
        .bind(contract.deed_status.as_str())
        .bind(contract.deed_recorded_on)
        .bind(&contract.deed_instrument_number)
        .bind(&contract.tax_parcel_number)
        .bind(contract.annual_property_tax)
        .bind(contract.updated_at)
        .bind(&contract.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found("Contract not found"));
        }

        Ok(())
    }
}
