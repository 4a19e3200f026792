//! # Money Module
//!
//! Provides the `Money` type for every price the configurator computes:
//! tier prices, option surcharges, setup/film costs and tax amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A tier price of 0.35 × multiplicator 1.5 × 250 pieces in floats       │
//! │  drifts by fractions of a cent, and the drift differs between the      │
//! │  option line, the parent line and the cart total.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Catalog decimals are converted ONCE on ingest (from_decimal)        │
//! │    Multiplicators are applied with an explicit rounding step (scale)   │
//! │    Everything after that is exact integer arithmetic                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use configurator_core::money::Money;
//!
//! let tier_price = Money::from_cents(35); // 0.35 per piece
//! let unit = tier_price.scale(1.5);        // 0.53 (rounded)
//! let total = unit.multiply_quantity(250); // 132.50
//! assert_eq!(total.cents(), 13250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results may go negative before they are
///   clamped with [`Money::clamp_non_negative`]
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// PriceTier.price ──► × multiplicator ──► ConfiguredLineItem.unit_price
///                                               │ × quantity
///                                               ▼
///                                  child total ──► folded into parent price
///
/// Field.setup_price ──► × multiplicator ──► SurchargeLineItem (one-time)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount (as stored by the merchant catalog) to cents.
    ///
    /// Rounds half away from zero. Non-finite input yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(12.5).cents(), 1250);
    /// assert_eq!(Money::from_decimal(0.005).cents(), 1);
    /// assert_eq!(Money::from_decimal(f64::NAN).cents(), 0);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Money::from_rounded(amount * 100.0)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal amount (for display and JSON output only).
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Floors the value at zero.
    ///
    /// Negative prices never reach the cart total.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Scales the amount by a multiplicator, rounding to the nearest cent.
    ///
    /// A non-finite product (NaN or infinite multiplicator) yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).scale(1.5).cents(), 1500);
    /// assert_eq!(Money::from_cents(35).scale(1.5).cents(), 53);
    /// assert_eq!(Money::from_cents(1000).scale(f64::INFINITY).cents(), 0);
    /// ```
    pub fn scale(&self, factor: f64) -> Money {
        Money::from_rounded(self.0 as f64 * factor)
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Divides the amount evenly over a quantity (integer cents, truncating).
    ///
    /// Used to spread a line total back over the unit price. The remainder
    /// cents stay in the total; the unit price is a display value.
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).per_unit(3).cents(), 333);
    /// assert_eq!(Money::from_cents(1000).per_unit(0).cents(), 1000);
    /// ```
    #[inline]
    pub const fn per_unit(&self, quantity: i64) -> Self {
        let divisor = if quantity < 1 { 1 } else { quantity };
        Money(self.0 / divisor)
    }

    /// Calculates tax on a net amount (tax is added on top).
    ///
    /// ## Implementation
    /// Integer math: `(amount * rate + 5000) / 10000`
    /// The +5000 provides rounding (5000/10000 = 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    /// use configurator_core::types::TaxRate;
    ///
    /// let net = Money::from_cents(1000);
    /// assert_eq!(net.calculate_tax(TaxRate::from_bps(1900)).cents(), 190);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Calculates the tax contained in a gross amount.
    ///
    /// ## Formula
    /// ```text
    /// tax = gross × rate / (1 + rate)
    ///     = (gross_cents × bps + (10000 + bps) / 2) / (10000 + bps)
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    /// use configurator_core::types::TaxRate;
    ///
    /// // 119.00 gross at 19% contains 19.00 tax
    /// let gross = Money::from_cents(11900);
    /// assert_eq!(gross.calculate_included_tax(TaxRate::from_bps(1900)).cents(), 1900);
    /// ```
    pub fn calculate_included_tax(&self, rate: TaxRate) -> Money {
        let divisor = 10000_i128 + rate.bps() as i128;
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + divisor / 2) / divisor;
        Money::from_cents(tax_cents as i64)
    }

    /// Returns the portion of the amount given by a share in basis points.
    ///
    /// Used to split an amount across tax rules (10000 = the whole amount).
    pub fn share_bps(&self, share: u32) -> Money {
        if share == 10000 {
            return *self;
        }
        let part = (self.0 as i128 * share as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    fn from_rounded(cents: f64) -> Self {
        if !cents.is_finite() {
            return Money::zero();
        }
        Money(cents.round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as a plain decimal amount (currency is a host concern).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by i64 (for quantity calculations). Saturates.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Decimal Wire Format
// =============================================================================

/// Serde adapter for catalog prices stored as decimal amounts.
///
/// The field holds cents; the wire carries `12.5` for 12.50.
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(with = "configurator_core::money::decimal")]
///     price: i64,
/// }
///
/// let row: Row = serde_json::from_str(r#"{ "price": 0.35 }"#).unwrap();
/// assert_eq!(row.price, 35);
/// ```
pub mod decimal {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(Money::from_cents(*cents).to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        if !amount.is_finite() {
            return Err(serde::de::Error::custom("price must be a finite number"));
        }
        Ok(Money::from_decimal(amount).cents())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_rounding() {
        assert_eq!(Money::from_decimal(10.99).cents(), 1099);
        assert_eq!(Money::from_decimal(0.125).cents(), 13);
        assert_eq!(Money::from_decimal(-2.5).cents(), -250);
        assert_eq!(Money::from_decimal(f64::INFINITY).cents(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(5)), "0.05");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_scale_with_multiplicator() {
        assert_eq!(Money::from_cents(800).scale(1.0).cents(), 800);
        assert_eq!(Money::from_cents(800).scale(0.5).cents(), 400);
        assert_eq!(Money::from_cents(333).scale(1.25).cents(), 416);
        assert_eq!(Money::from_cents(800).scale(f64::NAN).cents(), 0);
        assert_eq!(Money::from_cents(800).scale(-1.0).cents(), -800);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-1).clamp_non_negative(), Money::zero());
        assert_eq!(Money::from_cents(42).clamp_non_negative().cents(), 42);
    }

    #[test]
    fn test_per_unit_guards_zero_quantity() {
        assert_eq!(Money::from_cents(900).per_unit(3).cents(), 300);
        assert_eq!(Money::from_cents(900).per_unit(0).cents(), 900);
        assert_eq!(Money::from_cents(900).per_unit(-4).cents(), 900);
    }

    #[test]
    fn test_net_and_gross_tax() {
        let rate = TaxRate::from_bps(1900);
        assert_eq!(Money::from_cents(10000).calculate_tax(rate).cents(), 1900);
        assert_eq!(Money::from_cents(11900).calculate_included_tax(rate).cents(), 1900);

        // 10.00 gross at 7% contains 0.654... → 0.65
        let reduced = TaxRate::from_bps(700);
        assert_eq!(Money::from_cents(1000).calculate_included_tax(reduced).cents(), 65);
    }

    #[test]
    fn test_quantity_multiplication_saturates() {
        let huge = Money::from_cents(100_000_000_000_000);
        assert_eq!(huge.multiply_quantity(100_000).cents(), i64::MAX);
        assert_eq!((huge * 100_000).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MAX) + Money::from_cents(1)).cents(), i64::MAX);

        let mut total = Money::from_cents(i64::MIN);
        total -= Money::from_cents(1);
        assert_eq!(total.cents(), i64::MIN);
    }

    #[test]
    fn test_decimal_wire_format() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "decimal")]
            price: i64,
        }

        let row: Row = serde_json::from_str(r#"{ "price": 12.99 }"#).unwrap();
        assert_eq!(row.price, 1299);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"price":12.99}"#);

        let whole: Row = serde_json::from_str(r#"{ "price": 25 }"#).unwrap();
        assert_eq!(whole.price, 2500);
    }

    #[test]
    fn test_share_bps() {
        let amount = Money::from_cents(1000);
        assert_eq!(amount.share_bps(10000), amount);
        assert_eq!(amount.share_bps(5000).cents(), 500);
        assert_eq!(amount.share_bps(0).cents(), 0);
    }
}
