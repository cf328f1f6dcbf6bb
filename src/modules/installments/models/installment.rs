use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Whether an installment is part of the monthly cadence or the trailing
/// lump sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentKind {
    /// One of the monthly payments anchored at the first installment date
    Regular,
    /// Final lump-sum payment with its own due date
    Balloon,
}

impl InstallmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Balloon => "balloon",
        }
    }
}

impl std::fmt::Display for InstallmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for InstallmentKind {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "regular" => Ok(Self::Regular),
            "balloon" => Ok(Self::Balloon),
            _ => Err(format!("Invalid installment kind: {}", value)),
        }
    }
}

/// Installment payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Not yet paid
    Pending,
    /// Payment received, or due date predates the schedule's as-of date
    Paid,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for InstallmentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

/// A single scheduled payment under a contract.
///
/// Regular installments occupy numbers `1..=installment_count`; a balloon,
/// if present, takes `installment_count + 1`. Exactly one installment
/// exists per `(contract_id, installment_number)` pair. Rows are created
/// once by the schedule generator and only their status moves afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Installment {
    pub id: String,
    pub contract_id: String,
    pub property_id: String,
    /// 1-based position in the schedule
    pub installment_number: i32,
    pub due_date: NaiveDate,
    /// Payment amount, whole cents
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub kind: InstallmentKind,
    #[sqlx(try_from = "String")]
    pub status: InstallmentStatus,
    /// Date the payment was received, if one has been recorded
    pub paid_on: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Installment {
    /// Create a new installment row
    pub fn new(
        contract_id: String,
        property_id: String,
        installment_number: i32,
        due_date: NaiveDate,
        amount: Decimal,
        kind: InstallmentKind,
        status: InstallmentStatus,
    ) -> Result<Self> {
        if installment_number < 1 {
            return Err(AppError::validation(format!(
                "installment_number must be at least 1, got {}",
                installment_number
            )));
        }

        if amount <= Decimal::ZERO {
            return Err(AppError::validation(
                "installment amount must be positive",
            ));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            contract_id,
            property_id,
            installment_number,
            due_date,
            amount,
            kind,
            status,
            paid_on: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Record a received payment against this installment
    pub fn mark_paid(&mut self, paid_on: NaiveDate) -> Result<()> {
        if self.status == InstallmentStatus::Paid {
            return Err(AppError::conflict(format!(
                "installment {} is already paid",
                self.installment_number
            )));
        }

        self.status = InstallmentStatus::Paid;
        self.paid_on = Some(paid_on);
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    /// Pending and due strictly before the reference date
    pub fn is_past_due(&self, as_of: NaiveDate) -> bool {
        self.status == InstallmentStatus::Pending && self.due_date < as_of
    }
}
