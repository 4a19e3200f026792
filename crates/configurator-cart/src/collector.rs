//! # Collector
//!
//! First half of a cart pass: finds configured product lines, resolves
//! their selections against the catalog and hands the result to the
//! processor.
//!
//! ## Selection Sources
//! ```text
//! payload[selection_key]  present? ──yes──► parse, strip from payload
//!          │                                   │
//!          no                                  ├─ malformed ► skip line
//!          ▼                                   ▼
//! payload[applied_key]    present? ──yes──► parse (written by last pass)
//!          │
//!          no ─► not a configured line
//! ```
//!
//! Stripping the raw selection keeps it from being processed twice; the
//! processor writes the applied selection back so later passes can rebuild
//! the children.

use std::collections::HashMap;

use configurator_core::{Field, Selection};
use tracing::debug;

use crate::cart::{Cart, LineItemType};
use crate::catalog::CatalogRepository;
use crate::config::ConfiguratorConfig;

/// Resolved configuration of one product line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguratorData {
    pub selection: Selection,

    /// The product's fields, ordered by position.
    pub fields: Vec<Field>,
}

/// Collected configurator data keyed by line item id.
#[derive(Debug, Clone, Default)]
pub struct CartDataCollection {
    entries: HashMap<String, ConfiguratorData>,
}

impl CartDataCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line_item_id: impl Into<String>, data: ConfiguratorData) {
        self.entries.insert(line_item_id.into(), data);
    }

    pub fn get(&self, line_item_id: &str) -> Option<&ConfiguratorData> {
        self.entries.get(line_item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects configurator data for every configured product line.
pub fn collect<R>(cart: &mut Cart, catalog: &R, config: &ConfiguratorConfig) -> CartDataCollection
where
    R: CatalogRepository + ?Sized,
{
    let keys = &config.payload;
    let mut data = CartDataCollection::new();

    for line in cart
        .line_items
        .iter_mut()
        .filter(|l| l.kind == LineItemType::Product)
    {
        let selection = match line.payload.remove(&keys.selection_key) {
            Some(raw) => match Selection::from_payload(&raw) {
                Ok(Some(selection)) => selection,
                Ok(None) => {
                    debug!(line_item = %line.id, "Empty configurator selection, skipping");
                    line.payload.remove(&keys.applied_key);
                    continue;
                }
                Err(e) => {
                    debug!(line_item = %line.id, error = %e, "Malformed configurator selection, skipping");
                    line.payload.remove(&keys.applied_key);
                    continue;
                }
            },
            None => match line
                .payload
                .get(&keys.applied_key)
                .map(Selection::from_payload)
            {
                Some(Ok(Some(selection))) => selection,
                _ => continue,
            },
        };

        let fields = catalog.fields_for_product(line.reference_id(), config.catalog.max_fields);

        for field_id in selection.field_ids() {
            if !fields.iter().any(|f| f.id == field_id) {
                debug!(line_item = %line.id, field = %field_id, "Unknown configurator field ignored");
            }
        }

        debug!(
            line_item = %line.id,
            fields = fields.len(),
            selected = selection.len(),
            "Collected configurator data"
        );
        data.insert(line.id.clone(), ConfiguratorData { selection, fields });
    }

    data
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{LineItem, PriceDefinition};
    use crate::catalog::InMemoryCatalog;
    use configurator_core::Money;
    use serde_json::json;

    fn catalog() -> InMemoryCatalog {
        let field: Field = serde_json::from_value(json!({
            "id": "front",
            "name": "Front",
            "productId": "shirt",
            "options": [{
                "id": "screen",
                "name": "Screen print",
                "possibilities": [{ "id": "1c", "name": "1 colour" }]
            }]
        }))
        .unwrap();
        InMemoryCatalog::from_parts(vec![field], vec![]).unwrap()
    }

    fn line(id: &str, payload: serde_json::Value) -> LineItem {
        let mut item = LineItem::product(id, id, 1, PriceDefinition::new(Money::from_cents(500), vec![]));
        item.referenced_id = Some("shirt".to_string());
        item.payload = payload.as_object().cloned().unwrap_or_default();
        item
    }

    #[test]
    fn test_collect_strips_raw_selection() {
        let config = ConfiguratorConfig::default();
        let mut cart = Cart::new();
        cart.add(line("shirt-h1", json!({ "productConfigurator": { "front": "1c" } })))
            .unwrap();

        let data = collect(&mut cart, &catalog(), &config);

        let entry = data.get("shirt-h1").unwrap();
        assert_eq!(entry.selection.possibility_for("front"), Some("1c"));
        assert_eq!(entry.fields.len(), 1);
        assert!(!cart.get("shirt-h1").unwrap().payload.contains_key("productConfigurator"));
    }

    #[test]
    fn test_collect_falls_back_to_applied_selection() {
        let config = ConfiguratorConfig::default();
        let mut cart = Cart::new();
        cart.add(line("shirt-h1", json!({ "productConfiguratorApplied": { "front": "1c" } })))
            .unwrap();

        let data = collect(&mut cart, &catalog(), &config);
        assert_eq!(data.len(), 1);

        // still there for the next pass
        assert!(cart.get("shirt-h1").unwrap().payload.contains_key("productConfiguratorApplied"));
    }

    #[test]
    fn test_collect_skips_malformed_and_plain_lines() {
        let config = ConfiguratorConfig::default();
        let mut cart = Cart::new();
        cart.add(line("a", json!({ "productConfigurator": "front=1c" }))).unwrap();
        cart.add(line("b", json!({ "productConfigurator": {} }))).unwrap();
        cart.add(line("c", json!({}))).unwrap();
        cart.add(line(
            "d",
            json!({ "productConfigurator": { "front": 1 }, "productConfiguratorApplied": { "front": "1c" } }),
        ))
        .unwrap();

        let data = collect(&mut cart, &catalog(), &config);

        assert!(data.is_empty());
        assert!(cart.line_items.iter().all(|l| l.payload.is_empty()));
    }

    #[test]
    fn test_collect_keeps_unknown_references() {
        let config = ConfiguratorConfig::default();
        let mut cart = Cart::new();
        cart.add(line("shirt-h1", json!({ "productConfigurator": { "front": "1c", "ghost": "x" } })))
            .unwrap();

        let data = collect(&mut cart, &catalog(), &config);
        let entry = data.get("shirt-h1").unwrap();
        assert_eq!(entry.selection.len(), 2);
        assert_eq!(entry.fields.len(), 1);
    }
}
