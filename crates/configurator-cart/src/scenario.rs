//! # Scenario Files
//!
//! A scenario is a catalog, a product list and a sequence of adds, priced
//! end to end through [`CartService`]. Used by the `price-cart` binary.
//!
//! ## Format
//! ```json
//! {
//!   "catalog": [ { "id": "front", "name": "Front", "productId": "shirt", ... } ],
//!   "products": [ { "id": "shirt", "unitPrice": 5.00, "taxRules": [...] } ],
//!   "adds": [ { "productId": "shirt", "selection": { "front": "1c" }, "quantity": 2 } ]
//! }
//! ```

use configurator_core::{Field, Selection};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartPrice};
use crate::catalog::{InMemoryCatalog, Product};
use crate::config::ConfiguratorConfig;
use crate::error::CartResult;
use crate::service::CartService;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub catalog: Vec<Field>,
    pub products: Vec<Product>,
    #[serde(default)]
    pub adds: Vec<ScenarioAdd>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAdd {
    pub product_id: String,
    #[serde(default)]
    pub selection: Selection,
    pub quantity: i64,
}

/// Final cart state of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub cart: Cart,
    pub price: CartPrice,
}

impl Scenario {
    pub fn from_json(json: &str) -> CartResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Runs every add in order against a fresh cart.
    pub fn run(self, config: ConfiguratorConfig) -> CartResult<ScenarioReport> {
        let catalog = InMemoryCatalog::from_parts(self.catalog, self.products)?;
        let service = CartService::new(catalog, config);
        let mut cart = Cart::new();

        for add in &self.adds {
            service.add_product(&mut cart, &add.product_id, &add.selection, add.quantity)?;
        }

        let price = service.price(&cart);
        Ok(ScenarioReport { cart, price })
    }
}
