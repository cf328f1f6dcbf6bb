use rust_decimal::{Decimal, RoundingStrategy};

/// All contract amounts are US dollars with two fractional digits.
pub const SCALE: u32 = 2;

/// Rounds an amount to whole cents, half-cents rounding away from zero.
pub fn round(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    rounded
}

/// Validates that an amount is non-negative and has at most two decimal places.
pub fn validate(amount: Decimal) -> std::result::Result<(), String> {
    if amount < Decimal::ZERO {
        return Err(format!("amount cannot be negative, got {}", amount));
    }

    if amount.scale() > SCALE {
        return Err(format!(
            "amounts must have at most {} decimal places, got {}",
            SCALE, amount
        ));
    }

    Ok(())
}

/// Formats an amount with exactly two fractional digits, e.g. `195.00`.
pub fn format(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
