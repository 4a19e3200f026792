//! # Configurator Catalog
//!
//! Typed, read-only catalog records authored by the merchant and the
//! shopper's selection over them.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field  "Print position: front"   setup 25.00  film 12.00              │
//! │   └── ConfigOption "Screen print"  tiers [1-49: 1.20, 50+: 0.90]       │
//! │   │     ├── Possibility "1 colour"   × 1.0                             │
//! │   │     └── Possibility "2 colours"  × 1.8                             │
//! │   └── ConfigOption "Embroidery"    tiers [...]                         │
//! │         └── Possibility "up to 5000 stitches" × 1.0                    │
//! │                                                                         │
//! │  Selection = { field id → possibility id }                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are plain values connected by owned vectors; they are loaded
//! once per cart pass and never mutated during pricing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::tiers::PriceTierTable;
use crate::validation::ValidationResult;

// =============================================================================
// Field
// =============================================================================

/// A configurable slot on a product (e.g. "print position").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub product_id: Option<String>,

    /// One-time setup cost in cents, scaled by the chosen multiplicator.
    /// Decimal `setupPrice` on the wire.
    #[serde(default, rename = "setupPrice", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub setup_price_cents: i64,

    /// One-time film cost in cents, decimal `filmPrice` on the wire.
    #[serde(default, rename = "filmPrice", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub film_price_cents: i64,

    #[serde(default)]
    pub options: Vec<ConfigOption>,
}

fn default_true() -> bool {
    true
}

impl Field {
    #[inline]
    pub fn setup_price(&self) -> Money {
        Money::from_cents(self.setup_price_cents)
    }

    #[inline]
    pub fn film_price(&self) -> Money {
        Money::from_cents(self.film_price_cents)
    }

    /// Finds the option owning `possibility_id` together with the possibility.
    ///
    /// Options are searched in order; the first hit wins.
    pub fn option_and_possibility(&self, possibility_id: &str) -> Option<(&ConfigOption, &Possibility)> {
        self.options.iter().find_map(|option| {
            option
                .possibilities
                .iter()
                .find(|p| p.id == possibility_id)
                .map(|possibility| (option, possibility))
        })
    }

    /// Orders options and their possibilities by position (unset first).
    pub fn sort_by_position(&mut self) {
        self.options.sort_by_key(|o| o.position);
        for option in &mut self.options {
            option.possibilities.sort_by_key(|p| p.position);
        }
    }
}

// =============================================================================
// Option
// =============================================================================

/// A choice group within a field with its own tiered pricing
/// (e.g. "print method").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConfigOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub field_id: String,
    #[serde(default)]
    pub price_tiers: PriceTierTable,
    #[serde(default)]
    pub possibilities: Vec<Possibility>,
}

// =============================================================================
// Possibility
// =============================================================================

/// A concrete selectable value within an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Possibility {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub option_id: String,

    /// Applied to the tiered unit price and to setup / film prices.
    #[serde(default = "default_multiplicator")]
    pub multiplicator: f64,
}

fn default_multiplicator() -> f64 {
    1.0
}

// =============================================================================
// Selection
// =============================================================================

/// The shopper's choice: field id → possibility id.
///
/// Backed by a `BTreeMap`, so iteration and serialization are always in
/// byte-wise key order no matter how the selection was assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    pub fn new() -> Self {
        Selection(BTreeMap::new())
    }

    /// Reads a selection from a raw line item payload value.
    ///
    /// An empty object means "no configuration". Anything that is not an
    /// object of string possibility ids is rejected as a whole, so two
    /// payloads never share a hash unless every entry matches.
    pub fn from_payload(value: &Value) -> ValidationResult<Option<Selection>> {
        let object = value.as_object().ok_or_else(|| ValidationError::InvalidFormat {
            field: "selection".to_string(),
            reason: "must be an object of field id to possibility id".to_string(),
        })?;

        let mut entries = BTreeMap::new();
        for (field_id, possibility) in object {
            let possibility_id = possibility.as_str().ok_or_else(|| ValidationError::InvalidFormat {
                field: format!("selection.{}", field_id),
                reason: "possibility id must be a string".to_string(),
            })?;
            entries.insert(field_id.clone(), possibility_id.to_string());
        }

        if entries.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Selection(entries)))
        }
    }

    pub fn insert(&mut self, field_id: impl Into<String>, possibility_id: impl Into<String>) {
        self.0.insert(field_id.into(), possibility_id.into());
    }

    /// The chosen possibility for a field, if any.
    pub fn possibility_for(&self, field_id: &str) -> Option<&str> {
        self.0.get(field_id).map(String::as_str)
    }

    /// Field ids in canonical order.
    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The selection as a JSON object (for storing back into a payload).
    pub fn to_payload(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Selection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Selection(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
