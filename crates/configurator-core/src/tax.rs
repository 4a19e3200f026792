//! # Tax Module
//!
//! Calculated tax amounts, rate-keyed tax collections and the shared
//! gross / net / free calculation policy.
//!
//! ## Merge Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  target                      source                   target after      │
//! │  ─────────────────────       ─────────────────────    ───────────────   │
//! │  19%: tax 1.90 / 10.00   +   19%: tax 0.95 / 5.00  →  19%: 2.85 / 15.00 │
//! │                              7%: tax 0.35 / 5.00   →   7%: 0.35 /  5.00 │
//! │                                                                         │
//! │  Matching rate → increment in place. New rate → insert an owned copy.  │
//! │  Merge order never changes the per-rate totals.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{TaxRate, TaxRule, TaxState};

// =============================================================================
// Calculated Tax
// =============================================================================

/// The tax computed for one rate on one amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CalculatedTax {
    /// Tax amount.
    pub tax: Money,
    pub tax_rate: TaxRate,
    /// Amount the tax was calculated on.
    pub price: Money,
    pub label: String,
}

impl CalculatedTax {
    pub fn new(tax: Money, tax_rate: TaxRate, price: Money, label: impl Into<String>) -> Self {
        CalculatedTax {
            tax,
            tax_rate,
            price,
            label: label.into(),
        }
    }

    /// Adds another entry's tax and base amount into this one.
    pub fn increment(&mut self, other: &CalculatedTax) {
        self.tax += other.tax;
        self.price += other.price;
    }
}

// =============================================================================
// Tax Collection
// =============================================================================

/// Calculated taxes keyed by rate; at most one entry per rate.
///
/// `Clone` is a deep copy: entries are owned values, so a clone shares no
/// mutable state with its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct TaxCollection(Vec<CalculatedTax>);

impl TaxCollection {
    pub fn new() -> Self {
        TaxCollection(Vec::new())
    }

    /// Builds a collection from entries, merging any duplicate rates.
    pub fn from_taxes(taxes: impl IntoIterator<Item = CalculatedTax>) -> Self {
        let mut collection = TaxCollection::new();
        for tax in taxes {
            collection.add(tax);
        }
        collection
    }

    pub fn get(&self, rate: TaxRate) -> Option<&CalculatedTax> {
        self.0.iter().find(|t| t.tax_rate == rate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalculatedTax> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all tax amounts.
    pub fn amount(&self) -> Money {
        self.0.iter().map(|t| t.tax).sum()
    }

    /// Adds one entry: increments the entry with the same rate, or inserts.
    pub fn add(&mut self, tax: CalculatedTax) {
        match self.0.iter_mut().find(|t| t.tax_rate == tax.tax_rate) {
            Some(existing) => existing.increment(&tax),
            None => self.0.push(tax),
        }
    }

    /// Merges every entry of `source` into this collection.
    ///
    /// Same rate → tax and base amounts are summed into the existing entry.
    /// New rate → an owned copy is inserted. `source` is left untouched.
    pub fn merge(&mut self, source: &TaxCollection) {
        for tax in &source.0 {
            self.add(tax.clone());
        }
    }

    /// Returns a copy of this collection with `source` merged in.
    pub fn merged(&self, source: &TaxCollection) -> TaxCollection {
        let mut result = self.clone();
        result.merge(source);
        result
    }
}

/// Merges `source` into `target` (see [`TaxCollection::merge`]).
pub fn merge(target: &mut TaxCollection, source: &TaxCollection) {
    target.merge(source);
}

// =============================================================================
// Tax Calculation Policy
// =============================================================================

/// Computes the taxes for an amount under the channel's tax state.
///
/// ## Policy
/// ```text
/// amount ≤ 0 or no rules ──► empty
/// state = Free ────────────► empty
/// state = Net ─────────────► tax on top of the amount
/// otherwise (Gross) ───────► tax contained in the amount
/// ```
///
/// Every tax computation in the configurator goes through this function.
pub fn calculate_taxes(amount: Money, rules: &[TaxRule], state: TaxState) -> TaxCollection {
    if !amount.is_positive() || rules.is_empty() {
        return TaxCollection::new();
    }

    match state {
        TaxState::Free => TaxCollection::new(),
        TaxState::Net => calculate_net_taxes(amount, rules),
        TaxState::Gross => calculate_gross_taxes(amount, rules),
    }
}

/// Taxes for a net amount: each rule's share is taxed on top.
pub fn calculate_net_taxes(amount: Money, rules: &[TaxRule]) -> TaxCollection {
    TaxCollection::from_taxes(rules.iter().map(|rule| {
        let share = amount.share_bps(rule.percentage);
        CalculatedTax::new(share.calculate_tax(rule.tax_rate), rule.tax_rate, share, rule.name.clone())
    }))
}

/// Taxes for a gross amount: each rule's share already contains its tax.
pub fn calculate_gross_taxes(amount: Money, rules: &[TaxRule]) -> TaxCollection {
    TaxCollection::from_taxes(rules.iter().map(|rule| {
        let share = amount.share_bps(rule.percentage);
        CalculatedTax::new(
            share.calculate_included_tax(rule.tax_rate),
            rule.tax_rate,
            share,
            rule.name.clone(),
        )
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
