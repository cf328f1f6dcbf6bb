use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::modules::contracts::models::{ContractStatus, SaleType};
use crate::modules::installments::models::{InstallmentKind, InstallmentStatus};

/// One contract's servicing position in the portfolio summary.
///
/// Counters and sums come from the stored schedule, so a contract with no
/// generated installments reports zeros and no next due date.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PortfolioRow {
    pub contract_id: String,
    pub property_id: String,
    pub buyer_name: String,
    #[sqlx(try_from = "String")]
    pub sale_type: SaleType,
    #[sqlx(try_from = "String")]
    pub status: ContractStatus,
    pub installment_total: i64,
    pub installments_paid: i64,
    pub installments_pending: i64,
    /// Sum of paid installment amounts
    pub amount_paid: Decimal,
    /// Sum of pending installment amounts
    pub balance_remaining: Decimal,
    /// Earliest pending due date, if any
    pub next_due_date: Option<NaiveDate>,
}

/// One installment in the activity report, joined with its contract
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InstallmentActivityRow {
    pub contract_id: String,
    pub property_id: String,
    pub buyer_name: String,
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub kind: InstallmentKind,
    #[sqlx(try_from = "String")]
    pub status: InstallmentStatus,
    pub paid_on: Option<NaiveDate>,
}
