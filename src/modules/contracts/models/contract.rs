use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{money, AppError, Result};

/// How the property was sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    /// Contract for deed: seller-financed, title transfers after payoff
    Cfd,
    /// Outright cash sale, no installment schedule
    Cash,
}

impl SaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cfd => "cfd",
            Self::Cash => "cash",
        }
    }
}

impl std::fmt::Display for SaleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for SaleType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "cfd" => Ok(Self::Cfd),
            "cash" => Ok(Self::Cash),
            _ => Err(format!("Invalid sale type: {}", value)),
        }
    }
}

/// Contract lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Financing in progress
    Active,
    /// All installments satisfied
    PaidOff,
    /// Buyer defaulted on the schedule
    Defaulted,
    /// Contract cancelled before completion
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PaidOff => "paid_off",
            Self::Defaulted => "defaulted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for ContractStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(Self::Active),
            "paid_off" => Ok(Self::PaidOff),
            "defaulted" => Ok(Self::Defaulted),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid contract status: {}", value)),
        }
    }
}

/// Whether the deed has been recorded with the county
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeedStatus {
    /// Title still held by the seller, financing in progress
    NotRecorded,
    /// Deed recorded, title transferred
    Recorded,
}

impl DeedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRecorded => "not_recorded",
            Self::Recorded => "recorded",
        }
    }
}

impl std::fmt::Display for DeedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for DeedStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "not_recorded" => Ok(Self::NotRecorded),
            "recorded" => Ok(Self::Recorded),
            _ => Err(format!("Invalid deed status: {}", value)),
        }
    }
}

/// A seller-financed land sale agreement with one buyer.
///
/// The financing terms (`installment_amount`, `installment_count`,
/// `first_installment_date`, balloon fields) drive schedule generation.
/// Deed and tax fields track servicing obligations through payoff.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contract {
    pub id: String,
    pub property_id: String,
    pub buyer_name: String,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
    #[sqlx(try_from = "String")]
    pub sale_type: SaleType,
    #[sqlx(try_from = "String")]
    pub status: ContractStatus,
    /// Agreed sale price of the parcel
    pub sale_price: Decimal,
    /// Regular monthly payment amount
    pub installment_amount: Decimal,
    /// Number of regular monthly payments
    pub installment_count: i32,
    /// Due date of the first regular payment; anchors the monthly cadence
    pub first_installment_date: Option<NaiveDate>,
    /// Trailing lump-sum payment, participates only when positive
    pub balloon_amount: Option<Decimal>,
    pub balloon_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub deed_status: DeedStatus,
    pub deed_recorded_on: Option<NaiveDate>,
    pub deed_instrument_number: Option<String>,
    /// County assessor parcel reference for tax audits
    pub tax_parcel_number: Option<String>,
    pub annual_property_tax: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating a contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContract {
    pub property_id: String,
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_email: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
    pub sale_type: SaleType,
    pub sale_price: Decimal,
    #[serde(default)]
    pub installment_amount: Option<Decimal>,
    #[serde(default)]
    pub installment_count: Option<i32>,
    #[serde(default)]
    pub first_installment_date: Option<NaiveDate>,
    #[serde(default)]
    pub balloon_amount: Option<Decimal>,
    #[serde(default)]
    pub balloon_date: Option<NaiveDate>,
    #[serde(default)]
    pub tax_parcel_number: Option<String>,
    #[serde(default)]
    pub annual_property_tax: Option<Decimal>,
}

/// Financing terms, updatable only before any installments exist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub installment_amount: Decimal,
    pub installment_count: i32,
    pub first_installment_date: Option<NaiveDate>,
    #[serde(default)]
    pub balloon_amount: Option<Decimal>,
    #[serde(default)]
    pub balloon_date: Option<NaiveDate>,
}

impl Contract {
    /// Create a new contract with validation
    pub fn new(input: NewContract) -> Result<Self> {
        if input.property_id.trim().is_empty() {
            return Err(AppError::validation("property_id must not be empty"));
        }

        if input.buyer_name.trim().is_empty() {
            return Err(AppError::validation("buyer_name must not be empty"));
        }

        money::validate(input.sale_price)
            .map_err(|e| AppError::validation(format!("sale_price: {}", e)))?;

        let installment_amount = input.installment_amount.unwrap_or(Decimal::ZERO);
        let installment_count = input.installment_count.unwrap_or(0);

        Self::validate_terms(
            installment_amount,
            installment_count,
            input.balloon_amount,
            input.balloon_date,
        )?;

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            property_id: input.property_id,
            buyer_name: input.buyer_name,
            buyer_email: input.buyer_email,
            buyer_phone: input.buyer_phone,
            sale_type: input.sale_type,
            status: ContractStatus::Active,
            sale_price: input.sale_price,
            installment_amount,
            installment_count,
            first_installment_date: input.first_installment_date,
            balloon_amount: input.balloon_amount,
            balloon_date: input.balloon_date,
            deed_status: DeedStatus::NotRecorded,
            deed_recorded_on: None,
            deed_instrument_number: None,
            tax_parcel_number: input.tax_parcel_number,
            annual_property_tax: input.annual_property_tax,
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_terms(
        installment_amount: Decimal,
        installment_count: i32,
        balloon_amount: Option<Decimal>,
        balloon_date: Option<NaiveDate>,
    ) -> Result<()> {
        money::validate(installment_amount)
            .map_err(|e| AppError::validation(format!("installment_amount: {}", e)))?;

        if installment_count < 0 {
            return Err(AppError::validation(format!(
                "installment_count cannot be negative, got {}",
                installment_count
            )));
        }

        if let Some(balloon) = balloon_amount {
            money::validate(balloon)
                .map_err(|e| AppError::validation(format!("balloon_amount: {}", e)))?;

            if balloon > Decimal::ZERO && balloon_date.is_none() {
                return Err(AppError::validation(
                    "balloon_date is required when balloon_amount is positive",
                ));
            }
        }

        if balloon_date.is_some() && balloon_amount.unwrap_or(Decimal::ZERO) <= Decimal::ZERO {
            return Err(AppError::validation(
                "balloon_date requires a positive balloon_amount",
            ));
        }

        Ok(())
    }

    /// True when a positive balloon payment with a due date is on the books
    pub fn has_balloon(&self) -> bool {
        self.balloon_amount.map_or(false, |b| b > Decimal::ZERO) && self.balloon_date.is_some()
    }

    /// Total amount owed under the schedule: regulars plus any balloon
    pub fn financed_total(&self) -> Decimal {
        let regulars = self.installment_amount * Decimal::from(self.installment_count.max(0));
        let balloon = if self.has_balloon() {
            self.balloon_amount.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        money::round(regulars + balloon)
    }

    /// Replace the financing terms. The caller enforces that no
    /// installments have been generated yet.
    pub fn set_terms(&mut self, terms: FinancingTerms) -> Result<()> {
        Self::validate_terms(
            terms.installment_amount,
            terms.installment_count,
            terms.balloon_amount,
            terms.balloon_date,
        )?;

        self.installment_amount = terms.installment_amount;
        self.installment_count = terms.installment_count;
        self.first_installment_date = terms.first_installment_date;
        self.balloon_amount = terms.balloon_amount;
        self.balloon_date = terms.balloon_date;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    /// Record the deed with the county, transferring title
    pub fn record_deed(
        &mut self,
        recorded_on: NaiveDate,
        instrument_number: String,
    ) -> Result<()> {
        if self.deed_status == DeedStatus::Recorded {
            return Err(AppError::conflict(format!(
                "deed already recorded on {}",
                self.deed_recorded_on
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown date".to_string())
            )));
        }

        if instrument_number.trim().is_empty() {
            return Err(AppError::validation("instrument_number must not be empty"));
        }

        self.deed_status = DeedStatus::Recorded;
        self.deed_recorded_on = Some(recorded_on);
        self.deed_instrument_number = Some(instrument_number);
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    /// Update the tax-audit fields
    pub fn set_tax_fields(
        &mut self,
        tax_parcel_number: Option<String>,
        annual_property_tax: Option<Decimal>,
    ) -> Result<()> {
        if let Some(tax) = annual_property_tax {
            money::validate(tax)
                .map_err(|e| AppError::validation(format!("annual_property_tax: {}", e)))?;
        }

        self.tax_parcel_number = tax_parcel_number;
        self.annual_property_tax = annual_property_tax;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    /// Cancel an active contract
    pub fn cancel(&mut self) -> Result<()> {
        if self.status != ContractStatus::Active {
            return Err(AppError::conflict(format!(
                "only active contracts can be cancelled, contract is {}",
                self.status
            )));
        }

        self.status = ContractStatus::Cancelled;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    /// Mark an active contract fully satisfied
    pub fn mark_paid_off(&mut self) -> Result<()> {
        if self.status != ContractStatus::Active {
            return Err(AppError::conflict(format!(
                "only active contracts can be paid off, contract is {}",
                self.status
            )));
        }

        self.status = ContractStatus::PaidOff;
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }
}
