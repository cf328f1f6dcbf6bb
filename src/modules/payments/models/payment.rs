use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{money, AppError, Result};

/// How a payment arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Check,
    Cash,
    Ach,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Cash => "cash",
            Self::Ach => "ach",
            Self::Card => "card",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "check" => Ok(Self::Check),
            "cash" => Ok(Self::Cash),
            "ach" => Ok(Self::Ach),
            "card" => Ok(Self::Card),
            _ => Err(format!("Invalid payment method: {}", value)),
        }
    }
}

/// A received payment applied to one installment.
///
/// `external_ref` carries an outside processor's identifier when the
/// operator has one; this service never talks to the processor itself.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: String,
    pub contract_id: String,
    pub installment_id: String,
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub method: PaymentMethod,
    pub external_ref: Option<String>,
    /// Date the money arrived, as entered by the operator
    pub received_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for recording a payment
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    pub contract_id: String,
    pub installment_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub external_ref: Option<String>,
    pub received_on: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

impl Payment {
    pub fn new(input: NewPayment) -> Result<Self> {
        if input.contract_id.trim().is_empty() {
            return Err(AppError::validation("contract_id must not be empty"));
        }

        if input.installment_id.trim().is_empty() {
            return Err(AppError::validation("installment_id must not be empty"));
        }

        money::validate(input.amount)
            .map_err(|e| AppError::validation(format!("amount: {}", e)))?;

        if input.amount <= Decimal::ZERO {
            return Err(AppError::validation("payment amount must be positive"));
        }

        if let Some(ref external_ref) = input.external_ref {
            if external_ref.trim().is_empty() {
                return Err(AppError::validation(
                    "external_ref must not be empty when present",
                ));
            }
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            contract_id: input.contract_id,
            installment_id: input.installment_id,
            amount: input.amount,
            method: input.method,
            external_ref: input.external_ref,
            received_on: input.received_on,
            note: input.note,
            created_at: chrono::Utc::now().naive_utc(),
        })
    }
}
