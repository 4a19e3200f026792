//! # Calculated Prices
//!
//! The priced state of a line item after a pricing pass.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::tax::{calculate_taxes, TaxCollection};
use crate::types::{TaxRule, TaxState};

/// Unit / total price of a line with its taxes and the rules they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CalculatedPrice {
    pub unit_price: Money,
    pub total_price: Money,
    pub calculated_taxes: TaxCollection,
    pub tax_rules: Vec<TaxRule>,
    pub quantity: i64,
}

impl CalculatedPrice {
    /// Prices `quantity` units at `unit_price` under the channel tax state.
    ///
    /// Negative unit prices are clamped to zero.
    pub fn for_quantity(unit_price: Money, quantity: i64, tax_rules: Vec<TaxRule>, state: TaxState) -> Self {
        let unit_price = unit_price.clamp_non_negative();
        let total_price = unit_price.multiply_quantity(quantity);
        let calculated_taxes = calculate_taxes(total_price, &tax_rules, state);

        CalculatedPrice {
            unit_price,
            total_price,
            calculated_taxes,
            tax_rules,
            quantity,
        }
    }

    /// Folds an additional line total into this price.
    ///
    /// The unit price grows by `additional_total / max(1, quantity)`, the
    /// total by `additional_total`, and `additional_taxes` are merged into a
    /// copy of this price's taxes.
    pub fn fold_in(&mut self, additional_total: Money, additional_taxes: &TaxCollection) {
        self.unit_price += additional_total.per_unit(self.quantity);
        self.total_price += additional_total;
        self.calculated_taxes = self.calculated_taxes.merged(additional_taxes);
    }

    /// Snapshot of the unit / total price for audit display.
    pub fn base_price(&self) -> BasePrice {
        BasePrice {
            unit: self.unit_price,
            total: self.total_price,
        }
    }
}

/// The parent product price before configurator surcharges were folded in.
///
/// Display and audit only; never added back into a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BasePrice {
    pub unit: Money,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;

    fn vat() -> Vec<TaxRule> {
        vec![TaxRule::new(TaxRate::from_bps(1900), "19%")]
    }

    #[test]
    fn test_for_quantity() {
        let price = CalculatedPrice::for_quantity(Money::from_cents(1190), 3, vat(), TaxState::Gross);
        assert_eq!(price.total_price.cents(), 3570);
        assert_eq!(price.calculated_taxes.amount().cents(), 570);
    }

    #[test]
    fn test_for_quantity_clamps_negative_unit_price() {
        let price = CalculatedPrice::for_quantity(Money::from_cents(-100), 2, vat(), TaxState::Net);
        assert_eq!(price.unit_price, Money::zero());
        assert_eq!(price.total_price, Money::zero());
        assert!(price.calculated_taxes.is_empty());
    }

    #[test]
    fn test_fold_in() {
        let mut price = CalculatedPrice::for_quantity(Money::from_cents(1000), 4, vat(), TaxState::Net);
        let extra = crate::tax::calculate_taxes(Money::from_cents(200), &vat(), TaxState::Net);

        price.fold_in(Money::from_cents(200), &extra);

        assert_eq!(price.unit_price.cents(), 1050);
        assert_eq!(price.total_price.cents(), 4200);
        assert_eq!(price.calculated_taxes.amount().cents(), 760 + 38);
        assert_eq!(price.calculated_taxes.len(), 1);
    }
}
