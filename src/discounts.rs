//! Discounts
//!
//! Promo-code and standing-discount rules, plus the shared
//! percentage-of-minor-units arithmetic used when applying them.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

use crate::conditions::Condition;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// A fixed promo code mapping to a percentage discount.
///
/// Each calculator owns its own code table; there is no central registry.
#[derive(Debug, Clone)]
pub struct PromoCode {
    /// The code constant, e.g. `SHINE10`. Matching is case-insensitive.
    pub code: String,

    /// Breakdown line label, e.g. `Promo SHINE10 (10% off)`.
    pub label: String,

    /// Discount percentage applied to the pre-discount remainder.
    pub percent: Percentage,
}

/// A percentage discount applied before any promo code when its condition
/// holds (e.g. a returning-client discount).
#[derive(Debug, Clone)]
pub struct StandingDiscount {
    /// Unique id for the discount rule.
    pub id: String,

    /// Breakdown line label.
    pub label: String,

    /// Discount percentage applied to the pre-discount remainder.
    pub percent: Percentage,

    /// Condition under which the discount applies.
    pub when: Condition,
}

/// Find the promo rule matching the raw user input, if any.
///
/// Matching is a case-insensitive exact match on the trimmed input. Unknown
/// codes yield `None`; they are silently ignored by the engine rather than
/// surfaced as errors. At most one rule can match since codes are unique.
#[must_use]
pub fn match_promo<'a>(codes: &'a [PromoCode], input: &str) -> Option<&'a PromoCode> {
    let input = input.trim();

    if input.is_empty() {
        return None;
    }

    codes
        .iter()
        .find(|promo| promo.code.eq_ignore_ascii_case(input))
}

/// Calculate the discount amount in minor units for a percentage of a minor
/// unit amount, rounding midpoints away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows
/// or cannot be represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
