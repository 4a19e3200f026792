//! # Cart Container
//!
//! In-process cart holding top-level line items with typed children.
//!
//! ## Line Item Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (token, created_at)                                               │
//! │  ├── LineItem  shirt-25e40f...   qty 10   kind = product               │
//! │  │   ├── price_definition   unit 5.00 + tax rules                      │
//! │  │   ├── price              recomputed every pass                      │
//! │  │   ├── payload            selection, hash, base price                │
//! │  │   └── children                                                       │
//! │  │       ├── Option     "Front: Screen print 2 colours"                │
//! │  │       ├── Option     "---"                                           │
//! │  │       ├── Surcharge  setup-shirt  "Setup Price"                     │
//! │  │       └── Surcharge  film-shirt   "Film Price"                      │
//! │  └── LineItem  mug   qty 1   kind = product                            │
//! │                                                                         │
//! │  Cart::price() sums top-level lines ONLY. Children are display data.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Line item ids are unique within the cart
//! - Adding a stackable line under an existing id increases its quantity
//! - Child quantities always mirror the parent quantity

use chrono::{DateTime, Utc};
use configurator_core::compose::{sync_quantities, ConfiguredLineItem};
use configurator_core::{
    CalculatedPrice, CoreError, Money, SurchargeLineItem, TaxCollection, TaxRule, TaxState,
    MAX_ITEM_QUANTITY,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{CartError, CartResult};

// =============================================================================
// Line Item
// =============================================================================

/// What a line item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemType {
    Product,
    ConfiguratorOption,
    Surcharge,
}

/// How the host prices a line before any configurator adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDefinition {
    pub unit_price: Money,
    pub tax_rules: Vec<TaxRule>,
}

impl PriceDefinition {
    pub fn new(unit_price: Money, tax_rules: Vec<TaxRule>) -> Self {
        PriceDefinition {
            unit_price,
            tax_rules,
        }
    }

    /// Prices `quantity` units under the channel tax state.
    pub fn calculate(&self, quantity: i64, tax_state: TaxState) -> CalculatedPrice {
        CalculatedPrice::for_quantity(self.unit_price, quantity, self.tax_rules.clone(), tax_state)
    }
}

/// A child line attached under a product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChildLineItem {
    Option(ConfiguredLineItem),
    Surcharge(SurchargeLineItem),
}

impl ChildLineItem {
    pub fn kind(&self) -> LineItemType {
        match self {
            ChildLineItem::Option(_) => LineItemType::ConfiguratorOption,
            ChildLineItem::Surcharge(_) => LineItemType::Surcharge,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ChildLineItem::Option(option) => &option.label,
            ChildLineItem::Surcharge(surcharge) => &surcharge.label,
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            ChildLineItem::Option(option) => option.quantity,
            ChildLineItem::Surcharge(surcharge) => surcharge.quantity,
        }
    }
}

/// A top-level cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,

    /// Catalog id of the product, if the line refers to one.
    pub referenced_id: Option<String>,

    #[serde(rename = "type")]
    pub kind: LineItemType,
    pub label: String,
    pub quantity: i64,
    pub stackable: bool,
    pub removable: bool,
    pub price_definition: Option<PriceDefinition>,
    pub price: Option<CalculatedPrice>,

    /// Free-form key/value bag.
    #[serde(default)]
    pub payload: Map<String, Value>,

    #[serde(default)]
    pub children: Vec<ChildLineItem>,

    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Creates a stackable, removable product line.
    pub fn product(
        id: impl Into<String>,
        label: impl Into<String>,
        quantity: i64,
        price_definition: PriceDefinition,
    ) -> Self {
        let id = id.into();
        LineItem {
            referenced_id: Some(id.clone()),
            id,
            kind: LineItemType::Product,
            label: label.into(),
            quantity,
            stackable: true,
            removable: true,
            price_definition: Some(price_definition),
            price: None,
            payload: Map::new(),
            children: Vec::new(),
            added_at: Utc::now(),
        }
    }

    /// Catalog id, or the line's own id when it has none.
    pub fn reference_id(&self) -> &str {
        self.referenced_id.as_deref().unwrap_or(&self.id)
    }

    /// Sets the quantity and resyncs every child to it.
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        for child in &mut self.children {
            match child {
                ChildLineItem::Option(option) => sync_quantities(std::slice::from_mut(option), quantity),
                ChildLineItem::Surcharge(surcharge) => surcharge.quantity = quantity,
            }
        }
    }

    /// Total price, zero while unpriced.
    pub fn total_price(&self) -> Money {
        self.price.as_ref().map(|p| p.total_price).unwrap_or_default()
    }

    pub fn options(&self) -> impl Iterator<Item = &ConfiguredLineItem> {
        self.children.iter().filter_map(|child| match child {
            ChildLineItem::Option(option) => Some(option),
            ChildLineItem::Surcharge(_) => None,
        })
    }

    pub fn surcharges(&self) -> impl Iterator<Item = &SurchargeLineItem> {
        self.children.iter().filter_map(|child| match child {
            ChildLineItem::Surcharge(surcharge) => Some(surcharge),
            ChildLineItem::Option(_) => None,
        })
    }

    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub token: Uuid,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            token: Uuid::new_v4(),
            line_items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a line item, stacking onto an existing line with the same id.
    ///
    /// ## Returns
    /// - `Ok(true)` if the quantity was merged into an existing line
    /// - `Ok(false)` if the item was appended
    /// - `Err` if the existing line does not stack or the merged quantity
    ///   would exceed [`MAX_ITEM_QUANTITY`]
    pub fn add(&mut self, item: LineItem) -> CartResult<bool> {
        if let Some(existing) = self.get_mut(&item.id) {
            let new_qty = stacked_quantity(existing, item.quantity)?;
            existing.set_quantity(new_qty);
            return Ok(true);
        }

        self.line_items.push(item);
        Ok(false)
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|item| item.id == id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Removes a line item by id.
    pub fn remove(&mut self, id: &str) -> Option<LineItem> {
        let index = self.line_items.iter().position(|item| item.id == id)?;
        Some(self.line_items.remove(index))
    }

    /// Sets the quantity of a line item; 0 removes it.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> CartResult<()> {
        if quantity == 0 {
            return self
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| CartError::LineItemNotFound(id.to_string()));
        }

        let item = self
            .get_mut(id)
            .ok_or_else(|| CartError::LineItemNotFound(id.to_string()))?;
        item.set_quantity(quantity);
        Ok(())
    }

    /// Moves the line stored under `from` to `to`.
    ///
    /// If a line already exists under `to`, the moved quantity is stacked
    /// onto it and the moved line is dropped. Otherwise the line keeps its
    /// position in the cart.
    ///
    /// When stacking is refused the cart is left unchanged.
    pub fn rekey(&mut self, from: &str, to: &str) -> CartResult<()> {
        if from == to {
            return Ok(());
        }

        let index = self
            .line_items
            .iter()
            .position(|item| item.id == from)
            .ok_or_else(|| CartError::LineItemNotFound(from.to_string()))?;

        let moved_qty = self.line_items[index].quantity;
        match self.line_items.iter().position(|item| item.id == to) {
            Some(target) => {
                let new_qty = stacked_quantity(&self.line_items[target], moved_qty)?;
                self.line_items[target].set_quantity(new_qty);
                self.line_items.remove(index);
            }
            None => self.line_items[index].id = to.to_string(),
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.line_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.line_items.clear();
        self.created_at = Utc::now();
    }

    /// Calculates the cart price from top-level lines only.
    pub fn price(&self, tax_state: TaxState) -> CartPrice {
        let position_price: Money = self.line_items.iter().map(LineItem::total_price).sum();

        let mut calculated_taxes = TaxCollection::new();
        for price in self.line_items.iter().filter_map(|item| item.price.as_ref()) {
            calculated_taxes.merge(&price.calculated_taxes);
        }

        let tax = calculated_taxes.amount();
        let (net_price, total_price) = match tax_state {
            TaxState::Gross => (position_price - tax, position_price),
            TaxState::Net => (position_price, position_price + tax),
            TaxState::Free => (position_price, position_price),
        };

        CartPrice {
            net_price,
            total_price,
            position_price,
            calculated_taxes,
            tax_state,
        }
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPrice {
    pub net_price: Money,
    pub total_price: Money,

    /// Sum of top-level line totals as priced.
    pub position_price: Money,
    pub calculated_taxes: TaxCollection,
    pub tax_state: TaxState,
}

/// Quantity of `existing` after stacking `added` onto it.
fn stacked_quantity(existing: &LineItem, added: i64) -> CartResult<i64> {
    if !existing.stackable {
        return Err(CartError::NotStackable(existing.id.clone()));
    }

    let new_qty = existing.quantity.saturating_add(added);
    if new_qty > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: new_qty,
            max: MAX_ITEM_QUANTITY,
        }
        .into());
    }
    Ok(new_qty)
}

// =============================================================================
// Unit Tests
// =============================================================================
