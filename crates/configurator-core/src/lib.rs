//! # configurator-core: Pure Pricing Logic for Configurable Products
//!
//! Shoppers configure a printed product (print position, print method, ...)
//! and this crate computes what the configuration costs: tiered unit
//! surcharges, per-possibility multiplicators and one-time setup / film
//! costs, plus the identity that decides whether two cart entries are the
//! same configured product.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              configurator-cart (host integration)               │   │
//! │  │   collect ──► process            on_line_item_added             │   │
//! │  └──────┬──────────────┬─────────────────────┬─────────────────────┘   │
//! │         │              │                     │                          │
//! │  ┌──────▼──────────────▼─────────────────────▼─────────────────────┐   │
//! │  │               ★ configurator-core (THIS CRATE) ★                │   │
//! │  │                                                                 │   │
//! │  │  catalog ─► compose ─► pricing ─► surcharge       identity      │   │
//! │  │                │          │                          │          │   │
//! │  │              tiers       tax                       merge        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Field / ConfigOption / Possibility records, Selection
//! - [`tiers`] - Quantity tiers and first-match price resolution
//! - [`tax`] - Calculated taxes, rate-keyed merging, gross/net/free policy
//! - [`identity`] - Canonical configuration hash and line item identity
//! - [`compose`] - One configured child line per catalog field
//! - [`surcharge`] - Setup / film one-time cost aggregation
//! - [`pricing`] - The pricing pass folding children into the parent
//! - [`merge`] - Cart reconciliation on add, as a patch
//! - [`money`], [`types`], [`price`] - Value types
//! - [`validation`], [`error`] - Input checks and domain errors
//!
//! ## Example Usage
//!
//! ```rust
//! use configurator_core::money::Money;
//! use configurator_core::tiers::{resolve, PriceTier};
//!
//! let tiers = vec![
//!     PriceTier::new(Some(0), Some(9), Money::from_cents(1000)),
//!     PriceTier::new(Some(10), None, Money::from_cents(800)),
//! ];
//! assert_eq!(resolve(&tiers, 10).cents(), 800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod compose;
pub mod error;
pub mod identity;
pub mod merge;
pub mod money;
pub mod price;
pub mod pricing;
pub mod surcharge;
pub mod tax;
pub mod tiers;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{ConfigOption, Field, Possibility, Selection};
pub use compose::ConfiguredLineItem;
pub use error::{CoreError, CoreResult, ValidationError};
pub use identity::ConfigurationHash;
pub use money::Money;
pub use price::{BasePrice, CalculatedPrice};
pub use surcharge::{SurchargeKind, SurchargeLineItem};
pub use tax::{CalculatedTax, TaxCollection};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single configured product in the cart.
///
/// ## Business Reason
/// Print runs are large, but a six-digit quantity is almost always a typo.
pub const MAX_ITEM_QUANTITY: i64 = 100_000;

/// Maximum catalog price in cents (10 000 000.00).
///
/// Keeps `price × MAX_ITEM_QUANTITY` and the sums built from it well inside i64.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;
