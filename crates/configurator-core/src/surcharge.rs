//! # Setup & Film Surcharges
//!
//! One-time costs rolled up across all configured children of a product
//! line into at most two surcharge lines: one for setup, one for film.
//!
//! ## Aggregation
//! ```text
//! children                    setup contribution     film contribution
//! ───────────────────────     ──────────────────     ─────────────────
//! Front  × 1.8  setup 25.00    45.00                  film 12.00 → 21.60
//! Sleeve × 1.0  setup  0.00    (skipped)              film  0.00 (skipped)
//!                              ─────                  ─────
//!                              SurchargeLineItem      SurchargeLineItem
//!                              "Setup Price" 45.00    "Film Price" 21.60
//! ```
//!
//! The total is a one-time amount: it is NOT multiplied by the quantity.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::compose::ConfiguredLineItem;
use crate::money::Money;
use crate::price::CalculatedPrice;
use crate::tax::calculate_taxes;
use crate::types::{TaxRule, TaxState};

// =============================================================================
// Surcharge Kind
// =============================================================================

/// Which one-time cost a surcharge line aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SurchargeKind {
    Setup,
    Film,
}

impl SurchargeKind {
    pub const ALL: [SurchargeKind; 2] = [SurchargeKind::Setup, SurchargeKind::Film];

    pub fn label(&self) -> &'static str {
        match self {
            SurchargeKind::Setup => "Setup Price",
            SurchargeKind::Film => "Film Price",
        }
    }

    /// The child's raw cost for this kind (before the multiplicator).
    pub fn cost_of(&self, child: &ConfiguredLineItem) -> Money {
        match self {
            SurchargeKind::Setup => child.setup_price(),
            SurchargeKind::Film => child.film_price(),
        }
    }

    /// The child's contribution: cost × multiplicator.
    pub fn contribution_of(&self, child: &ConfiguredLineItem) -> Money {
        self.cost_of(child).scale(child.multiplicator)
    }
}

impl fmt::Display for SurchargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurchargeKind::Setup => write!(f, "setup"),
            SurchargeKind::Film => write!(f, "film"),
        }
    }
}

// =============================================================================
// Surcharge Line Item
// =============================================================================

/// One contributing child, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SurchargePosition {
    pub label: String,
    pub price: Money,
}

/// Aggregated setup or film cost attached under a product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SurchargeLineItem {
    /// `setup-<product id>` / `film-<product id>`.
    pub id: String,
    pub kind: SurchargeKind,
    pub label: String,

    /// Mirrors the parent quantity; the price is not scaled by it.
    pub quantity: i64,

    pub positions: Vec<SurchargePosition>,
    pub price: CalculatedPrice,
}

impl SurchargeLineItem {
    pub fn total_price(&self) -> Money {
        self.price.total_price
    }
}

/// Rolls up the `kind` costs of `children` into one surcharge line.
///
/// Only children whose contribution (cost × multiplicator) is positive take
/// part. Returns `None` when the floored total is zero, so no line is
/// attached for that kind. Taxes use the parent's rules with the aggregate
/// total as the taxable base.
pub fn aggregate(
    children: &[ConfiguredLineItem],
    kind: SurchargeKind,
    reference_id: &str,
    parent_quantity: i64,
    tax_rules: &[TaxRule],
    tax_state: TaxState,
) -> Option<SurchargeLineItem> {
    let positions: Vec<SurchargePosition> = children
        .iter()
        .filter_map(|child| {
            let contribution = kind.contribution_of(child);
            contribution.is_positive().then(|| SurchargePosition {
                label: child.label.clone(),
                price: contribution,
            })
        })
        .collect();

    let total = positions
        .iter()
        .map(|p| p.price)
        .sum::<Money>()
        .clamp_non_negative();

    if !total.is_positive() {
        return None;
    }

    let price = CalculatedPrice {
        unit_price: total,
        total_price: total,
        calculated_taxes: calculate_taxes(total, tax_rules, tax_state),
        tax_rules: tax_rules.to_vec(),
        quantity: 1,
    };

    Some(SurchargeLineItem {
        id: format!("{}-{}", kind, reference_id),
        kind,
        label: kind.label().to_string(),
        quantity: parent_quantity,
        positions,
        price,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
