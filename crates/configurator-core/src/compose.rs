//! # Line Item Composer
//!
//! Builds one configured child line per catalog field of a product.
//!
//! ## Composition
//! ```text
//! fields (catalog order)     selection            children
//! ──────────────────────     ─────────────        ─────────────────────────────
//! front  ───────────────────► front → 2c ───────► "Front: Screen print 2 colours"
//!                                                   tiers, × 1.8, setup, film
//! sleeve ───────────────────► (not chosen) ─────► "---"  tiers [], × 1.0
//! ```
//!
//! The composer walks the catalog, not the selection, so an unanswered
//! field still surfaces as a possibility-less child. Selection entries that
//! point at unknown fields or possibilities are ignored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{Field, Selection};
use crate::money::Money;
use crate::price::CalculatedPrice;
use crate::tiers::PriceTierTable;

/// Label for a child whose field has no resolvable possibility.
pub const UNRESOLVED_LABEL: &str = "---";

/// One chosen possibility, attached as a child of the product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConfiguredLineItem {
    pub field_id: String,
    pub possibility_id: Option<String>,
    pub label: String,

    /// Always mirrors the parent quantity.
    pub quantity: i64,

    pub price_tiers: PriceTierTable,
    pub multiplicator: f64,
    pub setup_price_cents: i64,
    pub film_price_cents: i64,

    /// Set by the pricing pass.
    pub price: Option<CalculatedPrice>,
}

impl ConfiguredLineItem {
    #[inline]
    pub fn setup_price(&self) -> Money {
        Money::from_cents(self.setup_price_cents)
    }

    #[inline]
    pub fn film_price(&self) -> Money {
        Money::from_cents(self.film_price_cents)
    }

    /// Total of the priced child, zero while unpriced.
    pub fn total_price(&self) -> Money {
        self.price.as_ref().map(|p| p.total_price).unwrap_or_default()
    }
}

/// Builds one child per field, in catalog order, for `quantity` units.
pub fn compose(fields: &[Field], selection: &Selection, quantity: i64) -> Vec<ConfiguredLineItem> {
    fields
        .iter()
        .map(|field| compose_field(field, selection.possibility_for(&field.id), quantity))
        .collect()
}

fn compose_field(field: &Field, possibility_id: Option<&str>, quantity: i64) -> ConfiguredLineItem {
    let resolved = possibility_id.and_then(|id| field.option_and_possibility(id));

    let (label, price_tiers, multiplicator) = match resolved {
        Some((option, possibility)) => (
            format!("{}: {} {}", field.name, option.name, possibility.name),
            option.price_tiers.clone(),
            possibility.multiplicator,
        ),
        None => (UNRESOLVED_LABEL.to_string(), PriceTierTable::default(), 1.0),
    };

    ConfiguredLineItem {
        field_id: field.id.clone(),
        possibility_id: possibility_id.map(str::to_string),
        label,
        quantity,
        price_tiers,
        multiplicator,
        setup_price_cents: field.setup_price_cents,
        film_price_cents: field.film_price_cents,
        price: None,
    }
}

/// Resyncs every child to the parent quantity.
pub fn sync_quantities(children: &mut [ConfiguredLineItem], quantity: i64) {
    for child in children {
        child.quantity = quantity;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
