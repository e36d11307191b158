//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Used for prices, rates, and proportional weights. All conversions back to
//! integer amounts are explicit (floor or round-half-up) so rounding policy
//! is visible at every call site.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::primitives::Amount;

/// Decimal value for financial calculations.
///
/// Backed by rust_decimal to avoid floating-point drift.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Format as a canonical string (no exponent notation, no trailing zeros).
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn one() -> Self {
        Decimal(RustDecimal::ONE)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Exact conversion from an integer amount, or None if the amount
    /// exceeds the decimal mantissa range.
    pub fn from_amount(amount: Amount) -> Option<Self> {
        if amount > i128::MAX as u128 {
            return None;
        }
        RustDecimal::try_from_i128_with_scale(amount as i128, 0)
            .ok()
            .map(Decimal)
    }

    /// `numerator / denominator` as a decimal; None if the denominator is
    /// zero or either side is out of range.
    pub fn from_ratio(numerator: Amount, denominator: Amount) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let n = Self::from_amount(numerator)?;
        let d = Self::from_amount(denominator)?;
        n.0.checked_div(d.0).map(Decimal)
    }

    /// Truncate toward zero to an integer amount; None for negative values
    /// or out-of-range results.
    pub fn to_amount_floor(&self) -> Option<Amount> {
        self.0.floor().to_u128()
    }

    /// Round half up (midpoint away from zero) to an integer amount.
    pub fn to_amount_round_half_up(&self) -> Option<Amount> {
        self.0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u128()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}
