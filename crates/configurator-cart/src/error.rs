//! # Cart Error Types
//!
//! Error types for the cart integration layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Cart          │  │     Domain              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  LineItemNot... │  │  Core (CoreError)       │ │
//! │  │  ConfigLoad...  │  │  NotStackable   │  │  Validation             │ │
//! │  │  ConfigSave...  │  │  ProductNot...  │  │  Serialization          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Malformed selections and unresolvable catalog references are NOT      │
//! │  errors: they are logged and skipped during a cart pass.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use configurator_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart error type.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configurator configuration.
    #[error("Invalid configurator configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Cart Errors
    // =========================================================================
    /// No line item with this id in the cart.
    #[error("Line item {0} not in cart")]
    LineItemNotFound(String),

    /// A line with this id exists and does not stack.
    #[error("Line item {0} already in cart and not stackable")]
    NotStackable(String),

    /// Product referenced by an add is unknown.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Error raised by the pricing core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// JSON encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        CartError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

impl CartError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_) | CartError::ConfigLoadFailed(_) | CartError::ConfigSaveFailed(_)
        )
    }
}
