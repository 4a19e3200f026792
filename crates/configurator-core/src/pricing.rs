//! # Pricing Pass
//!
//! Prices the configured children of one product line and folds their
//! totals into the parent price.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. each child:  unit = tier(quantity) × multiplicator  (≥ 0)          │
//! │                  total = unit × quantity, taxes via tax policy         │
//! │  2. Σ child totals, merge child taxes                                  │
//! │  3. Σ > 0 → record base price, parent += Σ  (unit += Σ / quantity)     │
//! │  4. setup / film surcharges → parent += surcharge totals               │
//! │                                                                         │
//! │  The host grand total only sums top-level lines, so everything a       │
//! │  child costs has to end up in the parent price.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pass is a pure function of (parent base price, freshly composed
//! children). Running it again on the same inputs gives the same result;
//! callers must hand in the un-adjusted parent price, never the output of
//! a previous pass.

use serde::{Deserialize, Serialize};

use crate::compose::ConfiguredLineItem;
use crate::money::Money;
use crate::price::{BasePrice, CalculatedPrice};
use crate::surcharge::{aggregate, SurchargeKind, SurchargeLineItem};
use crate::tax::TaxCollection;
use crate::types::{TaxContext, TaxRule, TaxState};

/// Result of pricing one configured product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOutcome {
    /// Parent price with option surcharges and one-time costs folded in.
    pub price: CalculatedPrice,

    /// Parent price before option surcharges; set when they were positive.
    pub base_price: Option<BasePrice>,

    /// Priced option children.
    pub options: Vec<ConfiguredLineItem>,

    /// Attached setup / film lines (0, 1 or 2).
    pub surcharges: Vec<SurchargeLineItem>,
}

/// Prices one child for its quantity (coerced to at least 1).
pub fn price_child(child: &ConfiguredLineItem, tax_rules: &[TaxRule], tax_state: TaxState) -> CalculatedPrice {
    let quantity = child.quantity.max(1);
    let unit_price = child
        .price_tiers
        .resolve(quantity)
        .scale(child.multiplicator)
        .clamp_non_negative();

    CalculatedPrice::for_quantity(unit_price, quantity, tax_rules.to_vec(), tax_state)
}

/// Runs the full pricing pass for one product line.
///
/// `parent_price` is the product's own price for its current quantity;
/// `children` are freshly composed for that same quantity.
pub fn price_configuration(
    parent_price: CalculatedPrice,
    mut children: Vec<ConfiguredLineItem>,
    reference_id: &str,
    context: &TaxContext,
) -> PricingOutcome {
    let mut price = parent_price;
    let tax_rules = price.tax_rules.clone();

    // Option surcharges
    let mut child_total = Money::zero();
    let mut child_taxes = TaxCollection::new();

    for child in &mut children {
        let child_price = price_child(child, &tax_rules, context.tax_state);
        child_total += child_price.total_price;
        child_taxes.merge(&child_price.calculated_taxes);
        child.price = Some(child_price);
    }

    let mut base_price = None;
    if child_total.is_positive() {
        base_price = Some(price.base_price());
        price.fold_in(child_total, &child_taxes);
    }

    // One-time setup / film costs
    let surcharges: Vec<SurchargeLineItem> = SurchargeKind::ALL
        .iter()
        .filter_map(|kind| {
            aggregate(
                &children,
                *kind,
                reference_id,
                price.quantity,
                &tax_rules,
                context.tax_state,
            )
        })
        .collect();

    let mut surcharge_total = Money::zero();
    let mut surcharge_taxes = TaxCollection::new();
    for surcharge in &surcharges {
        surcharge_total += surcharge.total_price();
        surcharge_taxes.merge(&surcharge.price.calculated_taxes);
    }

    if surcharge_total.is_positive() {
        price.fold_in(surcharge_total, &surcharge_taxes);
    }

    PricingOutcome {
        price,
        base_price,
        options: children,
        surcharges,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Field, Selection};
    use crate::compose::compose;
    use crate::types::TaxRate;
    use serde_json::json;

    fn catalog() -> Vec<Field> {
        serde_json::from_value(json!([
            {
                "id": "front",
                "name": "Front",
                "setupPrice": 25.00,
                "filmPrice": 10.00,
                "options": [{
                    "id": "screen",
                    "name": "Screen print",
                    "priceTiers": [
                        { "quantityStart": 0, "quantityEnd": 9, "price": 10.00 },
                        { "quantityStart": 10, "quantityEnd": null, "price": 8.00 }
                    ],
                    "possibilities": [
                        { "id": "1c", "name": "1 colour" },
                        { "id": "2c", "name": "2 colours", "multiplicator": 1.5 }
                    ]
                }]
            },
            {
                "id": "back",
                "name": "Back",
                "options": [{
                    "id": "none",
                    "name": "No print",
                    "possibilities": [{ "id": "blank", "name": "blank", "multiplicator": 0.0 }]
                }]
            }
        ]))
        .unwrap()
    }

    fn vat() -> Vec<TaxRule> {
        vec![TaxRule::new(TaxRate::from_bps(1900), "19%")]
    }

    fn parent(unit_cents: i64, quantity: i64, state: TaxState) -> CalculatedPrice {
        CalculatedPrice::for_quantity(Money::from_cents(unit_cents), quantity, vat(), state)
    }

    fn run(selection: &Selection, quantity: i64, state: TaxState) -> PricingOutcome {
        let context = TaxContext::new(state, "EUR");
        let children = compose(&catalog(), selection, quantity);
        price_configuration(parent(500, quantity, state), children, "shirt", &context)
    }

    #[test]
    fn test_child_prices_follow_tiers_and_multiplicator() {
        let selection: Selection = [("front", "2c"), ("back", "blank")].into_iter().collect();
        let outcome = run(&selection, 12, TaxState::Net);

        let front = outcome.options[0].price.as_ref().unwrap();
        assert_eq!(front.unit_price.cents(), 1200); // 8.00 × 1.5
        assert_eq!(front.total_price.cents(), 14400);

        let back = outcome.options[1].price.as_ref().unwrap();
        assert_eq!(back.total_price, Money::zero());
        assert!(back.calculated_taxes.is_empty());
    }

    #[test]
    fn test_parent_absorbs_children_and_surcharges() {
        let selection: Selection = [("front", "1c")].into_iter().collect();
        let outcome = run(&selection, 4, TaxState::Net);

        // parent 4 × 5.00 = 20.00, options 4 × 10.00 = 40.00
        let base = outcome.base_price.unwrap();
        assert_eq!(base.total.cents(), 2000);
        assert_eq!(base.unit.cents(), 500);

        // setup 25.00 + film 10.00, one-time
        assert_eq!(outcome.surcharges.len(), 2);
        assert_eq!(outcome.surcharges[0].kind, SurchargeKind::Setup);
        assert_eq!(outcome.surcharges[1].kind, SurchargeKind::Film);

        assert_eq!(outcome.price.total_price.cents(), 2000 + 4000 + 2500 + 1000);
        assert_eq!(outcome.price.unit_price.cents(), 500 + 1000 + 875);

        let taxes = outcome.price.calculated_taxes.get(TaxRate::from_bps(1900)).unwrap();
        assert_eq!(taxes.price.cents(), 9500);
        assert_eq!(taxes.tax.cents(), 380 + 760 + 475 + 190);
    }

    #[test]
    fn test_zero_surcharges_leave_parent_unchanged() {
        let selection: Selection = [("back", "blank")].into_iter().collect();
        let context = TaxContext::new(TaxState::Gross, "EUR");
        let children = compose(&catalog()[1..], &selection, 3);
        let before = parent(500, 3, TaxState::Gross);

        let outcome = price_configuration(before.clone(), children, "shirt", &context);

        assert_eq!(outcome.price, before);
        assert!(outcome.base_price.is_none());
        assert!(outcome.surcharges.is_empty());
    }

    #[test]
    fn test_pricing_is_idempotent_from_fresh_inputs() {
        let selection: Selection = [("front", "2c"), ("back", "blank")].into_iter().collect();

        let first = run(&selection, 7, TaxState::Gross);
        let second = run(&selection, 7, TaxState::Gross);

        assert_eq!(first.price, second.price);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_quantity_child_is_priced_for_one() {
        let selection: Selection = [("front", "1c")].into_iter().collect();
        let children = compose(&catalog(), &selection, 0);

        let price = price_child(&children[0], &vat(), TaxState::Net);
        assert_eq!(price.quantity, 1);
        assert_eq!(price.total_price.cents(), 1000);
    }
}
