//! # Error Types
//!
//! Domain-specific error types for configurator-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  configurator-core errors (this file)                                  │
//! │  ├── CoreError        - Domain failures (identity, quantity, ...)      │
//! │  └── ValidationError  - Catalog / input validation failures            │
//! │                                                                         │
//! │  configurator-cart errors (separate crate)                             │
//! │  └── CartError        - Config, I/O, cart container failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → host                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Non-fatal by Default
//! Pricing itself never fails: malformed selections and unresolvable ids
//! are skipped, negative prices are clamped. Errors here are for the edges
//! (catalog ingest, identity encoding, shopper quantities).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A selection could not be encoded canonically for hashing.
    ///
    /// ## When This Occurs
    /// - The selection payload holds values that serde_json cannot encode
    ///
    /// The line item is left untouched (no configuration stamp).
    #[error("Failed to encode configuration: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A field id appears twice in one catalog.
    #[error("Field {0} is defined more than once")]
    DuplicateField(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when merchant catalog data or shopper input does not meet
/// requirements. Used for early validation before pricing runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., non-finite multiplicator).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLarge {
            requested: 200_000,
            max: 100_000,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 200000 exceeds maximum allowed (100000)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "field.name".to_string(),
        };
        assert_eq!(err.to_string(), "field.name is required");

        let err = ValidationError::MustNotBeNegative {
            field: "setup_price".to_string(),
        };
        assert_eq!(err.to_string(), "setup_price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
