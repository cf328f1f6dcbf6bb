use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::core::{money, AppError, Result};
use crate::modules::contracts::models::{Contract, ContractStatus, SaleType};
use crate::modules::installments::models::{Installment, InstallmentKind, InstallmentStatus};

/// Why a contract was passed over during schedule generation.
///
/// Skips are per contract and non-fatal: callers log the reason and move
/// on to the next contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Cash sale, nothing is financed
    NotFinanced,
    /// Contract is no longer active
    InactiveContract,
    MissingFirstInstallmentDate,
    ZeroInstallmentCount,
    ZeroInstallmentAmount,
    /// Installments already exist; generation runs at most once per contract
    AlreadyGenerated { existing: i64 },
}

impl SkipReason {
    pub fn is_already_generated(&self) -> bool {
        matches!(self, Self::AlreadyGenerated { .. })
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinanced => write!(f, "cash sale, no installment schedule"),
            Self::InactiveContract => write!(f, "contract is not active"),
            Self::MissingFirstInstallmentDate => write!(f, "no first installment date on file"),
            Self::ZeroInstallmentCount => write!(f, "installment count is zero"),
            Self::ZeroInstallmentAmount => write!(f, "installment amount is zero"),
            Self::AlreadyGenerated { existing } => {
                write!(f, "schedule already generated ({} installments)", existing)
            }
        }
    }
}

/// Deterministic installment schedule generation.
///
/// `generate` is a pure function of `(contract, as_of)`: no I/O, no wall
/// clock. Reruns and backdated imports produce identical schedules for
/// the same inputs.
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// Check whether a contract qualifies for generation. Returns the
    /// reason to skip, or `None` when eligible.
    ///
    /// The `AlreadyGenerated` guard lives with the caller, since only the
    /// store knows whether installments exist.
    pub fn eligibility(contract: &Contract) -> Option<SkipReason> {
        if contract.sale_type != SaleType::Cfd {
            return Some(SkipReason::NotFinanced);
        }

        if contract.status != ContractStatus::Active {
            return Some(SkipReason::InactiveContract);
        }

        if contract.first_installment_date.is_none() {
            return Some(SkipReason::MissingFirstInstallmentDate);
        }

        if contract.installment_count <= 0 {
            return Some(SkipReason::ZeroInstallmentCount);
        }

        if contract.installment_amount <= Decimal::ZERO {
            return Some(SkipReason::ZeroInstallmentAmount);
        }

        None
    }

    /// Build the full schedule for an eligible contract, ordered by
    /// installment number.
    ///
    /// Regular due dates are `first_installment_date + i months`, each
    /// computed from the anchor so that day-of-month overflow clamps to
    /// the last valid day of the target month (a January 31 anchor yields
    /// February 28, then March 31). A balloon, when present, follows the
    /// regulars at number `installment_count + 1` with its stored due date
    /// taken verbatim.
    ///
    /// Status backfill is a strict comparison: due dates before `as_of`
    /// come out `Paid`, everything else `Pending`. An installment due on
    /// `as_of` itself is still pending.
    pub fn generate(contract: &Contract, as_of: NaiveDate) -> Result<Vec<Installment>> {
        let first = contract.first_installment_date.ok_or_else(|| {
            AppError::validation(format!(
                "contract {} has no first installment date",
                contract.id
            ))
        })?;

        let count = contract.installment_count;
        let amount = money::round(contract.installment_amount);

        let mut schedule = Vec::with_capacity(count as usize + 1);

        for i in 0..count {
            let due_date = first
                .checked_add_months(Months::new(i as u32))
                .ok_or_else(|| {
                    AppError::internal(format!("due date overflow at installment {}", i + 1))
                })?;

            schedule.push(Installment::new(
                contract.id.clone(),
                contract.property_id.clone(),
                i + 1,
                due_date,
                amount,
                InstallmentKind::Regular,
                Self::status_as_of(due_date, as_of),
            )?);
        }

        if let (Some(balloon_amount), Some(balloon_date)) =
            (contract.balloon_amount, contract.balloon_date)
        {
            if balloon_amount > Decimal::ZERO {
                schedule.push(Installment::new(
                    contract.id.clone(),
                    contract.property_id.clone(),
                    count + 1,
                    balloon_date,
                    money::round(balloon_amount),
                    InstallmentKind::Balloon,
                    Self::status_as_of(balloon_date, as_of),
                )?);
            }
        }

        Ok(schedule)
    }

    fn status_as_of(due_date: NaiveDate, as_of: NaiveDate) -> InstallmentStatus {
        if due_date < as_of {
            InstallmentStatus::Paid
        } else {
            InstallmentStatus::Pending
        }
    }
}
