//! Money amounts.
//!
//! Amounts are `Decimal`s in the store's single currency and are persisted as JSON
//! numbers. Display formatting is a separate, non-persisted transform.

pub use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Require `amount > 0`.
pub fn ensure_positive(amount: Decimal) -> DomainResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::invalid_amount(amount));
    }
    Ok(amount)
}

/// Require `amount >= 0`, reporting `field` on failure.
pub fn ensure_non_negative(field: &str, amount: Decimal) -> DomainResult<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::validation(field, "must not be negative"));
    }
    Ok(amount)
}

/// Render an amount with two decimals, e.g. `-$12.50`.
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.abs().round_dp(2);
    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{symbol}{rounded:.2}")
}
