//! # Catalog Repository
//!
//! Read access to configurator fields and sellable products.
//!
//! ## Repository Seam
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  collect()                                                              │
//! │     │  catalog.fields_for_product("shirt", max_fields)                  │
//! │     ▼                                                                   │
//! │  CatalogRepository (trait)                                              │
//! │  ├── fields_for_product(&self, product_id, limit)                       │
//! │  └── product(&self, id)                                                 │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  InMemoryCatalog   (validated on insert, ordered by position)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields without a `productId` are shared and offered on every product.

use std::collections::HashMap;

use configurator_core::validation::{validate_catalog, validate_price_cents, validate_tax_rules};
use configurator_core::{Field, Money, TaxRule, ValidationError};
use serde::{Deserialize, Serialize};

use crate::cart::PriceDefinition;
use crate::error::CartResult;

/// A sellable product as far as the cart is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Unit price in cents, decimal `unitPrice` on the wire.
    #[serde(rename = "unitPrice", with = "configurator_core::money::decimal")]
    pub unit_price_cents: i64,
    #[serde(default)]
    pub tax_rules: Vec<TaxRule>,
}

impl Product {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    pub fn price_definition(&self) -> PriceDefinition {
        PriceDefinition::new(self.unit_price(), self.tax_rules.clone())
    }

    /// Display label, falling back to the id.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Catalog access used by the collector and the cart service.
pub trait CatalogRepository {
    /// Fields offered on a product, ordered by position, at most `limit`.
    ///
    /// Options and possibilities come back ordered by position as well.
    fn fields_for_product(&self, product_id: &str, limit: usize) -> Vec<Field>;

    fn product(&self, id: &str) -> Option<Product>;
}

/// Catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    shared_fields: Vec<Field>,
    product_fields: HashMap<String, Vec<Field>>,
    products: HashMap<String, Product>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from fields and products, validating every entry.
    pub fn from_parts(fields: Vec<Field>, products: Vec<Product>) -> CartResult<Self> {
        let mut catalog = Self::new();
        for field in fields {
            catalog.insert_field(field)?;
        }
        for product in products {
            catalog.insert_product(product)?;
        }
        Ok(catalog)
    }

    /// Adds a field.
    ///
    /// Every field list a product would see after the insert (its own fields
    /// plus the shared ones) must pass catalog validation, so field ids stay
    /// unique per product.
    pub fn insert_field(&mut self, field: Field) -> CartResult<()> {
        let scopes: Vec<&[Field]> = match &field.product_id {
            Some(product_id) => vec![self
                .product_fields
                .get(product_id)
                .map(Vec::as_slice)
                .unwrap_or_default()],
            None if self.product_fields.is_empty() => vec![&[] as &[Field]],
            None => self.product_fields.values().map(Vec::as_slice).collect(),
        };

        for own in scopes {
            let view: Vec<Field> = own
                .iter()
                .chain(&self.shared_fields)
                .chain(std::iter::once(&field))
                .cloned()
                .collect();
            validate_catalog(&view)?;
        }

        match field.product_id.clone() {
            Some(product_id) => self.product_fields.entry(product_id).or_default().push(field),
            None => self.shared_fields.push(field),
        }
        Ok(())
    }

    /// Adds or replaces a product after checking its price and tax rules.
    pub fn insert_product(&mut self, product: Product) -> CartResult<()> {
        if product.id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product.id".to_string(),
            }
            .into());
        }
        validate_price_cents(product.unit_price_cents, "product.unit_price")?;
        validate_tax_rules(&product.tax_rules)?;

        self.products.insert(product.id.clone(), product);
        Ok(())
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn fields_for_product(&self, product_id: &str, limit: usize) -> Vec<Field> {
        let own = self.product_fields.get(product_id).map(Vec::as_slice).unwrap_or_default();

        let mut fields: Vec<Field> = own.iter().chain(&self.shared_fields).cloned().collect();
        fields.sort_by_key(|f| f.position);
        fields.truncate(limit);

        for field in &mut fields {
            field.sort_by_position();
        }

        fields
    }

    fn product(&self, id: &str) -> Option<Product> {
        self.products.get(id).cloned()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
