//! # Line Item Added Subscriber
//!
//! Runs once per add, after the cart's own same-id stacking and before any
//! pricing. Gives configured items their configuration identity so equal
//! configurations stack and different ones stay apart.
//!
//! ## Flow
//! ```text
//! BeforeLineItemAdded { line_item (raw id P), is_merged }
//!        │
//!        ├─ no selection in payload ──────────────► untouched
//!        ├─ selection not field → id strings ────► warn, untouched
//!        ├─ hash fails ──────────────────────────► warn, untouched
//!        ▼
//! reconcile(line under P, incoming, is_merged) ──► CartPatch
//!        │
//!        ▼
//! apply ops in order:  Remove │ SetQuantity │ Rekey │ Restamp │ InsertIncoming
//! ```

use configurator_core::identity::{compute_hash, ConfigurationHash};
use configurator_core::merge::{reconcile, CartOp, CartPatch, ExistingLine, IncomingItem};
use configurator_core::Selection;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cart::{Cart, LineItem};
use crate::config::{ConfiguratorConfig, PayloadKeys};
use crate::error::{CartError, CartResult};

/// Raised after the cart accepted a line item, before recalculation.
#[derive(Debug, Clone)]
pub struct BeforeLineItemAdded {
    /// The item as it was handed to the cart, under its raw id.
    pub line_item: LineItem,

    /// Whether the cart stacked it onto an existing line.
    pub is_merged: bool,
}

/// Reconciles a freshly added configured item against the cart.
///
/// Returns the applied patch, or `None` when the item carries no usable
/// configuration and was left as is.
pub fn on_line_item_added(
    cart: &mut Cart,
    event: &BeforeLineItemAdded,
    config: &ConfiguratorConfig,
) -> CartResult<Option<CartPatch>> {
    let keys = &config.payload;
    let item = &event.line_item;

    let Some(raw) = item.payload.get(&keys.selection_key) else {
        return Ok(None);
    };

    let selection = match Selection::from_payload(raw) {
        Ok(Some(selection)) => selection,
        Ok(None) => return Ok(None),
        Err(e) => {
            warn!(line_item = %item.id, error = %e, "Unreadable configuration, leaving item unstamped");
            return Ok(None);
        }
    };

    let hash = match compute_hash(&selection) {
        Ok(Some(hash)) => hash,
        Ok(None) => return Ok(None),
        Err(e) => {
            warn!(line_item = %item.id, error = %e, "Could not hash configuration, leaving item unstamped");
            return Ok(None);
        }
    };

    let incoming = IncomingItem {
        raw_id: item.id.clone(),
        referenced_id: item.referenced_id.clone(),
        quantity: item.quantity,
        hash,
    };

    let existing = cart.get(&item.id).map(|line| ExistingLine {
        id: line.id.clone(),
        referenced_id: line.referenced_id.clone(),
        quantity: line.quantity,
        hash: line.payload_str(&keys.hash_key).map(ConfigurationHash::from),
    });

    let patch = reconcile(existing.as_ref(), &incoming, event.is_merged);
    debug!(
        line_item = %item.id,
        identity = %incoming.identity(),
        state = ?patch.state,
        ops = patch.ops.len(),
        "Reconciled configured item"
    );

    apply(cart, &patch, item, &selection, keys)?;
    Ok(Some(patch))
}

fn apply(cart: &mut Cart, patch: &CartPatch, incoming: &LineItem, selection: &Selection, keys: &PayloadKeys) -> CartResult<()> {
    for op in &patch.ops {
        match op {
            CartOp::Remove { id } => {
                cart.remove(id);
            }
            CartOp::SetQuantity { id, quantity } => cart.set_quantity(id, *quantity)?,
            CartOp::Rekey { from, to } => cart.rekey(from, to)?,
            CartOp::Restamp { id, hash } => {
                let line = cart
                    .get_mut(id)
                    .ok_or_else(|| CartError::LineItemNotFound(id.clone()))?;
                stamp(line, hash, selection, keys);
            }
            CartOp::InsertIncoming { id, hash } => {
                let mut item = incoming.clone();
                item.id = id.clone();
                cart.add(item)?;

                let line = cart
                    .get_mut(id)
                    .ok_or_else(|| CartError::LineItemNotFound(id.clone()))?;
                stamp(line, hash, selection, keys);
            }
        }
    }
    Ok(())
}

fn stamp(line: &mut LineItem, hash: &ConfigurationHash, selection: &Selection, keys: &PayloadKeys) {
    line.payload
        .insert(keys.hash_key.clone(), Value::String(hash.to_string()));
    line.payload
        .insert(keys.selection_key.clone(), selection.to_payload());
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::PriceDefinition;
    use configurator_core::merge::MergeState;
    use configurator_core::Money;

    fn selection(possibility: &str) -> Selection {
        [("field1", possibility)].into_iter().collect()
    }

    fn hash_of(selection: &Selection) -> String {
        compute_hash(selection).unwrap().unwrap().to_string()
    }

    fn product_line(id: &str, quantity: i64, selection: Option<&Selection>) -> LineItem {
        let mut item = LineItem::product(id, "Shirt", quantity, PriceDefinition::new(Money::from_cents(500), vec![]));
        if let Some(selection) = selection {
            item.payload
                .insert("productConfigurator".to_string(), selection.to_payload());
        }
        item
    }

    fn add(cart: &mut Cart, item: LineItem) -> CartResult<Option<CartPatch>> {
        let is_merged = cart.add(item.clone())?;
        let event = BeforeLineItemAdded {
            line_item: item,
            is_merged,
        };
        on_line_item_added(cart, &event, &ConfiguratorConfig::default())
    }

    #[test]
    fn test_identical_configurations_stack() {
        let s1 = selection("poss1");
        let mut cart = Cart::new();

        add(&mut cart, product_line("P", 1, Some(&s1))).unwrap();
        add(&mut cart, product_line("P", 1, Some(&s1))).unwrap();

        let id = format!("P-{}", hash_of(&s1));
        assert_eq!(cart.len(), 1);
        let line = cart.get(&id).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.payload_str("configuratorHash"), Some(hash_of(&s1).as_str()));
    }

    #[test]
    fn test_different_configurations_stay_apart() {
        let mut cart = Cart::new();

        add(&mut cart, product_line("P", 1, Some(&selection("poss1")))).unwrap();
        add(&mut cart, product_line("P", 1, Some(&selection("poss2")))).unwrap();

        assert_eq!(cart.len(), 2);
        assert!(cart.has(&format!("P-{}", hash_of(&selection("poss1")))));
        assert!(cart.has(&format!("P-{}", hash_of(&selection("poss2")))));
        assert!(!cart.has("P"));
    }

    #[test]
    fn test_split_moves_remainder_to_its_own_identity() {
        let s1 = selection("poss1");
        let s2 = selection("poss2");

        let mut existing = product_line("P", 3, Some(&s1));
        existing
            .payload
            .insert("configuratorHash".to_string(), Value::String(hash_of(&s1)));
        let mut cart = Cart::new();
        cart.add(existing).unwrap();

        let event = BeforeLineItemAdded {
            line_item: product_line("P", 1, Some(&s2)),
            is_merged: true,
        };
        let patch = on_line_item_added(&mut cart, &event, &ConfiguratorConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(patch.state, MergeState::SplitTarget);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(&format!("P-{}", hash_of(&s1))).unwrap().quantity, 2);
        assert_eq!(cart.get(&format!("P-{}", hash_of(&s2))).unwrap().quantity, 1);
    }

    #[test]
    fn test_split_with_nothing_left_removes_existing() {
        let s2 = selection("poss2");
        let mut cart = Cart::new();
        cart.add(product_line("P", 1, None)).unwrap();

        let event = BeforeLineItemAdded {
            line_item: product_line("P", 1, Some(&s2)),
            is_merged: true,
        };
        on_line_item_added(&mut cart, &event, &ConfiguratorConfig::default()).unwrap();

        assert_eq!(cart.len(), 1);
        assert!(cart.has(&format!("P-{}", hash_of(&s2))));
    }

    #[test]
    fn test_merge_into_vanished_line_inserts() {
        let s1 = selection("poss1");
        let mut cart = Cart::new();

        let event = BeforeLineItemAdded {
            line_item: product_line("P", 2, Some(&s1)),
            is_merged: true,
        };
        let patch = on_line_item_added(&mut cart, &event, &ConfiguratorConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(patch.state, MergeState::Fresh);
        assert_eq!(cart.get(&format!("P-{}", hash_of(&s1))).unwrap().quantity, 2);
    }

    #[test]
    fn test_merge_target_restamps_in_place() {
        let s1 = selection("poss1");
        let id = format!("P-{}", hash_of(&s1));
        let mut cart = Cart::new();

        let mut item = product_line(&id, 1, Some(&s1));
        item.referenced_id = Some("P".to_string());
        add(&mut cart, item.clone()).unwrap();
        let patch = add(&mut cart, item).unwrap().unwrap();

        assert_eq!(patch.state, MergeState::MergeTarget);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&id).unwrap().quantity, 2);
    }

    #[test]
    fn test_selection_with_non_string_entry_is_not_stamped() {
        let mut cart = Cart::new();
        let mut item = product_line("P", 1, None);
        item.payload.insert(
            "productConfigurator".to_string(),
            serde_json::json!({ "field1": 1, "field2": "poss1" }),
        );

        let patch = add(&mut cart, item).unwrap();

        assert!(patch.is_none());
        assert!(cart.has("P"));
        assert!(cart.get("P").unwrap().payload_str("configuratorHash").is_none());
    }

    #[test]
    fn test_item_without_selection_is_untouched() {
        let mut cart = Cart::new();

        let patch = add(&mut cart, product_line("P", 1, None)).unwrap();

        assert!(patch.is_none());
        assert!(cart.has("P"));
        assert!(cart.get("P").unwrap().payload.is_empty());
    }
}
