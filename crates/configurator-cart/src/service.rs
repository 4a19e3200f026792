//! # Cart Service
//!
//! Drives the host sequence around the pricing engine.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopper Action          Service Call               Cart Change         │
//! │  ──────────────          ────────────               ───────────         │
//! │                                                                         │
//! │  Add configured ───────► add_configured_item() ──► Cart::add            │
//! │  product                                            on_line_item_added  │
//! │                                                     recalculate         │
//! │                                                                         │
//! │  Change quantity ──────► change_quantity() ──────► set_quantity         │
//! │                                                     recalculate         │
//! │                                                                         │
//! │  Remove ───────────────► remove_line_item() ─────► remove, recalculate  │
//! │                                                                         │
//! │  recalculate() = collect + process, from scratch every time             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use configurator_core::merge::CartPatch;
use configurator_core::validation::validate_quantity;
use configurator_core::Selection;
use tracing::info;

use crate::cart::{Cart, CartPrice, LineItem};
use crate::catalog::{CatalogRepository, Product};
use crate::collector::collect;
use crate::config::ConfiguratorConfig;
use crate::error::{CartError, CartResult};
use crate::processor::process;
use crate::subscriber::{on_line_item_added, BeforeLineItemAdded};

/// Cart operations for configurable products.
#[derive(Debug, Clone)]
pub struct CartService<R> {
    catalog: R,
    config: ConfiguratorConfig,
}

impl<R: CatalogRepository> CartService<R> {
    pub fn new(catalog: R, config: ConfiguratorConfig) -> Self {
        CartService { catalog, config }
    }

    pub fn catalog(&self) -> &R {
        &self.catalog
    }

    pub fn config(&self) -> &ConfiguratorConfig {
        &self.config
    }

    /// Adds a product with a selection and reprices the cart.
    ///
    /// Returns the merge patch that was applied, if the item was configured.
    pub fn add_configured_item(
        &self,
        cart: &mut Cart,
        product: &Product,
        selection: &Selection,
        quantity: i64,
    ) -> CartResult<Option<CartPatch>> {
        validate_quantity(quantity)?;

        let mut item = LineItem::product(&product.id, product.label(), quantity, product.price_definition());
        if !selection.is_empty() {
            item.payload
                .insert(self.config.payload.selection_key.clone(), selection.to_payload());
        }

        let is_merged = cart.add(item.clone())?;
        let event = BeforeLineItemAdded {
            line_item: item,
            is_merged,
        };
        let patch = on_line_item_added(cart, &event, &self.config)?;

        info!(
            product = %product.id,
            quantity,
            merged = is_merged,
            configured = patch.is_some(),
            "Item added to cart"
        );

        self.recalculate(cart);
        Ok(patch)
    }

    /// Looks the product up in the catalog and adds it.
    pub fn add_product(
        &self,
        cart: &mut Cart,
        product_id: &str,
        selection: &Selection,
        quantity: i64,
    ) -> CartResult<Option<CartPatch>> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| CartError::ProductNotFound(product_id.to_string()))?;
        self.add_configured_item(cart, &product, selection, quantity)
    }

    /// Changes the quantity of a line and reprices the cart.
    pub fn change_quantity(&self, cart: &mut Cart, line_item_id: &str, quantity: i64) -> CartResult<()> {
        validate_quantity(quantity)?;
        cart.set_quantity(line_item_id, quantity)?;

        info!(line_item = %line_item_id, quantity, "Quantity changed");
        self.recalculate(cart);
        Ok(())
    }

    /// Removes a line and reprices the cart.
    pub fn remove_line_item(&self, cart: &mut Cart, line_item_id: &str) -> CartResult<()> {
        cart.remove(line_item_id)
            .ok_or_else(|| CartError::LineItemNotFound(line_item_id.to_string()))?;

        info!(line_item = %line_item_id, "Item removed from cart");
        self.recalculate(cart);
        Ok(())
    }

    /// Reprices every line from scratch.
    pub fn recalculate(&self, cart: &mut Cart) {
        let data = collect(cart, &self.catalog, &self.config);
        process(&data, cart, &self.config.tax_context(), &self.config);
    }

    pub fn price(&self, cart: &Cart) -> CartPrice {
        cart.price(self.config.pricing.tax_state)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
