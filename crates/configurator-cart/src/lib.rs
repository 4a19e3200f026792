//! # configurator-cart: Cart Integration for the Configurator
//!
//! Runs the pure pricing engine of `configurator-core` inside a cart.
//!
//! ## Cart Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add ──► Cart::add (same-id stacking) ──► on_line_item_added            │
//! │                                           (identity + merge policy)     │
//! │                                                │                        │
//! │                                                ▼                        │
//! │  recalculate:   collect ──────────────────► process                     │
//! │                 (selection + catalog)       (reset, compose, price,     │
//! │                                              attach children)           │
//! │                                                                         │
//! │  Cart::price sums top-level lines                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart container, line items, typed children, cart price
//! - [`catalog`] - Catalog repository seam and in-memory catalog
//! - [`collector`] - Selection and catalog resolution per line
//! - [`processor`] - Pricing pass per line
//! - [`subscriber`] - Identity and merge policy on add
//! - [`service`] - `CartService` façade
//! - [`scenario`] - JSON scenario runner
//! - [`config`], [`error`] - Runtime settings and errors
//!
//! ## Logging
//! Everything in this crate logs through `tracing`; install a subscriber in
//! the binary (see `price-cart`).

pub mod cart;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod processor;
pub mod scenario;
pub mod service;
pub mod subscriber;

pub use cart::{Cart, CartPrice, ChildLineItem, LineItem, LineItemType, PriceDefinition};
pub use catalog::{CatalogRepository, InMemoryCatalog, Product};
pub use collector::{collect, CartDataCollection, ConfiguratorData};
pub use config::ConfiguratorConfig;
pub use error::{CartError, CartResult};
pub use processor::process;
pub use scenario::{Scenario, ScenarioReport};
pub use service::CartService;
pub use subscriber::{on_line_item_added, BeforeLineItemAdded};
