//! # Price Tiers
//!
//! Quantity-range → unit-price tables attached to every configurator option.
//!
//! ## Resolution Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tiers (declaration order):                                             │
//! │    [ 0 ..=   9 ] → 10.00                                                │
//! │    [10 ..= ∞   ] →  8.00                                                │
//! │                                                                         │
//! │  resolve(5)  → 10.00   first tier containing 5                          │
//! │  resolve(10) →  8.00   boundaries are inclusive on both ends            │
//! │  resolve(0)  → 10.00                                                    │
//! │                                                                         │
//! │  FIRST match in declaration order wins - tiers are never re-sorted,    │
//! │  overlapping tiers resolve by authoring order. No match → 0.00.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Price Tier
// =============================================================================

/// One quantity range with its unit price.
///
/// `None` bounds are open: a missing start matches from zero, a missing end
/// is unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceTier {
    #[serde(default)]
    pub quantity_start: Option<i64>,

    #[serde(default)]
    pub quantity_end: Option<i64>,

    /// Unit price in cents. Carried as a decimal `price` on the wire.
    #[serde(rename = "price", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub price_cents: i64,
}

impl PriceTier {
    pub fn new(quantity_start: Option<i64>, quantity_end: Option<i64>, price: Money) -> Self {
        PriceTier {
            quantity_start,
            quantity_end,
            price_cents: price.cents(),
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the quantity falls inside this tier (inclusive bounds).
    pub fn contains(&self, quantity: i64) -> bool {
        let above_start = self.quantity_start.map_or(true, |start| quantity >= start);
        let below_end = self.quantity_end.map_or(true, |end| quantity <= end);
        above_start && below_end
    }
}

// =============================================================================
// Price Tier Table
// =============================================================================

/// Ordered tier list for one option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct PriceTierTable(Vec<PriceTier>);

impl PriceTierTable {
    pub fn new(tiers: Vec<PriceTier>) -> Self {
        PriceTierTable(tiers)
    }

    pub fn tiers(&self) -> &[PriceTier] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves the unit price for a quantity. See [`resolve`].
    pub fn resolve(&self, quantity: i64) -> Money {
        resolve(&self.0, quantity)
    }
}

impl From<Vec<PriceTier>> for PriceTierTable {
    fn from(tiers: Vec<PriceTier>) -> Self {
        PriceTierTable(tiers)
    }
}

/// Returns the price of the first tier (in declaration order) containing
/// `quantity`, or zero when no tier matches.
///
/// Callers coerce line item quantities to at least 1 before the lookup.
///
/// ## Example
/// ```rust
/// use configurator_core::money::Money;
/// use configurator_core::tiers::{resolve, PriceTier};
///
/// let tiers = vec![
///     PriceTier::new(Some(0), Some(9), Money::from_cents(1000)),
///     PriceTier::new(Some(10), None, Money::from_cents(800)),
/// ];
/// assert_eq!(resolve(&tiers, 5).cents(), 1000);
/// assert_eq!(resolve(&tiers, 10).cents(), 800);
/// ```
pub fn resolve(tiers: &[PriceTier], quantity: i64) -> Money {
    tiers
        .iter()
        .find(|tier| tier.contains(quantity))
        .map(PriceTier::price)
        .unwrap_or_else(Money::zero)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_tiers() -> Vec<PriceTier> {
        vec![
            PriceTier::new(Some(0), Some(9), Money::from_cents(1000)),
            PriceTier::new(Some(10), None, Money::from_cents(800)),
        ]
    }

    #[test]
    fn test_resolve_tier_boundaries() {
        let tiers = standard_tiers();
        assert_eq!(resolve(&tiers, 5).cents(), 1000);
        assert_eq!(resolve(&tiers, 10).cents(), 800);
        assert_eq!(resolve(&tiers, 0).cents(), 1000);
        assert_eq!(resolve(&tiers, 9).cents(), 1000);
        assert_eq!(resolve(&tiers, 10_000).cents(), 800);
    }

    #[test]
    fn test_no_matching_tier_resolves_to_zero() {
        let tiers = vec![PriceTier::new(Some(100), Some(499), Money::from_cents(50))];
        assert_eq!(resolve(&tiers, 99), Money::zero());
        assert_eq!(resolve(&tiers, 500), Money::zero());
        assert_eq!(resolve(&[], 1), Money::zero());
    }

    #[test]
    fn test_first_match_wins_for_overlapping_tiers() {
        // The wide tier is declared first, so it shadows the narrow one.
        let tiers = vec![
            PriceTier::new(Some(1), None, Money::from_cents(500)),
            PriceTier::new(Some(10), Some(20), Money::from_cents(300)),
        ];
        assert_eq!(resolve(&tiers, 15).cents(), 500);

        let reversed: Vec<PriceTier> = tiers.into_iter().rev().collect();
        assert_eq!(resolve(&reversed, 15).cents(), 300);
    }

    #[test]
    fn test_open_start_matches_from_zero() {
        let tiers = vec![PriceTier::new(None, Some(4), Money::from_cents(120))];
        assert_eq!(resolve(&tiers, 1).cents(), 120);
        assert_eq!(resolve(&tiers, 5), Money::zero());
    }

    #[test]
    fn test_table_deserializes_from_tier_list() {
        let table: PriceTierTable = serde_json::from_value(serde_json::json!([
            { "quantityStart": 0, "quantityEnd": 9, "price": 10.00 },
            { "quantityStart": 10, "quantityEnd": null, "price": 8.00 }
        ]))
        .unwrap();

        assert_eq!(table.tiers().len(), 2);
        assert_eq!(table.resolve(12).cents(), 800);
    }
}
