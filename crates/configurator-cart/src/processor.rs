//! # Processor
//!
//! Second half of a cart pass: prices every product line from its price
//! definition and, for configured lines, runs the pricing pass and attaches
//! the children.
//!
//! ## Per Line
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. reset    price = definition × quantity, children cleared            │
//! │  2. compose  one option child per catalog field                         │
//! │  3. price    price_configuration(reset price, children)                 │
//! │  4. attach   option + surcharge children, base price, applied selection │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 1 makes every pass start from the product's own price, so running
//! the pass again never adds surcharges twice.

use configurator_core::compose::compose;
use configurator_core::pricing::price_configuration;
use configurator_core::TaxContext;
use serde_json::json;
use tracing::debug;

use crate::cart::{Cart, ChildLineItem, LineItemType};
use crate::collector::CartDataCollection;
use crate::config::ConfiguratorConfig;

/// Prices every product line of the cart in place.
pub fn process(data: &CartDataCollection, cart: &mut Cart, context: &TaxContext, config: &ConfiguratorConfig) {
    let keys = &config.payload;

    for line in cart
        .line_items
        .iter_mut()
        .filter(|l| l.kind == LineItemType::Product)
    {
        let Some(definition) = &line.price_definition else {
            continue;
        };
        let price = definition.calculate(line.quantity, context.tax_state);

        line.children.clear();
        line.payload.remove(&keys.base_price_key);

        let Some(entry) = data.get(&line.id) else {
            line.price = Some(price);
            continue;
        };

        let children = compose(&entry.fields, &entry.selection, line.quantity);
        let reference_id = line.reference_id().to_string();
        let outcome = price_configuration(price, children, &reference_id, context);

        if let Some(base) = outcome.base_price {
            line.payload.insert(
                keys.base_price_key.clone(),
                json!({ "unit": base.unit.cents(), "total": base.total.cents() }),
            );
        }
        line.payload
            .insert(keys.applied_key.clone(), entry.selection.to_payload());

        debug!(
            line_item = %line.id,
            options = outcome.options.len(),
            surcharges = outcome.surcharges.len(),
            total = %outcome.price.total_price,
            "Priced configured line"
        );

        line.children = outcome
            .options
            .into_iter()
            .map(ChildLineItem::Option)
            .chain(outcome.surcharges.into_iter().map(ChildLineItem::Surcharge))
            .collect();
        line.price = Some(outcome.price);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
