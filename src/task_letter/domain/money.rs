//! Advance money carried by the traveller.

use super::TaskLetterDomainError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Maximum number of fractional digits, matching `NUMERIC(12, 2)`.
const MAX_SCALE: u32 = 2;

/// Exclusive upper bound for the integer part, matching `NUMERIC(12, 2)`.
const MAX_INTEGER_BOUND: i64 = 10_000_000_000;

/// Non-negative exact monetary amount.
///
/// Serialises as a decimal string so the value never passes through a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AdvanceMoney(Decimal);

impl AdvanceMoney {
    /// Creates a validated amount.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLetterDomainError::NegativeAdvanceMoney`] for amounts
    /// below zero and [`TaskLetterDomainError::AdvanceMoneyOutOfRange`] for
    /// amounts that do not fit the storage precision.
    pub fn new(value: Decimal) -> Result<Self, TaskLetterDomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(TaskLetterDomainError::NegativeAdvanceMoney(value.to_string()));
        }
        let normalized = value.normalize();
        if normalized.scale() > MAX_SCALE || normalized >= Decimal::from(MAX_INTEGER_BOUND) {
            return Err(TaskLetterDomainError::AdvanceMoneyOutOfRange(
                value.to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns a zero amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the wrapped decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for AdvanceMoney {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
