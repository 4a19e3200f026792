//! # Validation Module
//!
//! Checks merchant catalog data and shopper input before pricing runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Catalog ingest (repository insert)                                    │
//! │  ├── ids / names present                                               │
//! │  ├── setup / film / unit prices in 0..=MAX_PRICE_CENTS                 │
//! │  ├── multiplicators finite and ≥ 0                                     │
//! │  ├── tiers: price in range, end ≥ start  (overlaps are allowed)        │
//! │  └── tax rules: rate and share ≤ 100%                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Add to cart                                                           │
//! │  └── quantity in 1..=MAX_ITEM_QUANTITY                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Pricing never fails: anything left over is clamped or skipped         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::catalog::{ConfigOption, Field, Possibility};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::tiers::PriceTier;
use crate::types::TaxRule;
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Scalar Validators
// =============================================================================

fn require(value: &str, field: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a shopper quantity.
///
/// ## Example
/// ```rust
/// use configurator_core::validation::validate_quantity;
///
/// assert!(validate_quantity(250).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents (zero allowed, at most `MAX_PRICE_CENTS`).
pub fn validate_price_cents(cents: i64, field: &str) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }
    Ok(())
}

/// Validates a possibility multiplicator.
pub fn validate_multiplicator(multiplicator: f64) -> ValidationResult<()> {
    if !multiplicator.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "multiplicator".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if multiplicator < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "multiplicator".to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }
    Ok(())
}

/// Validates the tax rules of a price definition.
pub fn validate_tax_rules(rules: &[TaxRule]) -> ValidationResult<()> {
    for rule in rules {
        validate_tax_rate_bps(rule.tax_rate.bps())?;
        if rule.percentage > 10000 {
            return Err(ValidationError::OutOfRange {
                field: "tax_rule.percentage".to_string(),
                min: 0,
                max: 10000,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates one price tier.
///
/// Tiers are not checked against each other: overlapping ranges are legal
/// and resolve by declaration order.
pub fn validate_price_tier(tier: &PriceTier) -> ValidationResult<()> {
    validate_price_cents(tier.price_cents, "tier.price")?;

    if let Some(start) = tier.quantity_start {
        if start < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "tier.quantity_start".to_string(),
            });
        }
    }

    if let (Some(start), Some(end)) = (tier.quantity_start, tier.quantity_end) {
        if end < start {
            return Err(ValidationError::OutOfRange {
                field: "tier.quantity_end".to_string(),
                min: start,
                max: i64::MAX,
            });
        }
    }

    Ok(())
}

fn validate_possibility(possibility: &Possibility) -> ValidationResult<()> {
    require(&possibility.id, "possibility.id")?;
    require(&possibility.name, "possibility.name")?;
    validate_multiplicator(possibility.multiplicator)
}

fn validate_option(option: &ConfigOption) -> ValidationResult<()> {
    require(&option.id, "option.id")?;
    require(&option.name, "option.name")?;
    option
        .price_tiers
        .tiers()
        .iter()
        .try_for_each(validate_price_tier)?;
    option.possibilities.iter().try_for_each(validate_possibility)
}

/// Validates a field with all of its options and possibilities.
pub fn validate_field(field: &Field) -> ValidationResult<()> {
    require(&field.id, "field.id")?;
    require(&field.name, "field.name")?;
    validate_price_cents(field.setup_price_cents, "field.setup_price")?;
    validate_price_cents(field.film_price_cents, "field.film_price")?;
    field.options.iter().try_for_each(validate_option)
}

/// Validates a product's field list (each field, and unique field ids).
pub fn validate_catalog(fields: &[Field]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        validate_field(field)?;
        if !seen.insert(field.id.as_str()) {
            return Err(CoreError::DuplicateField(field.id.clone()));
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use serde_json::json;

    fn field() -> Field {
        serde_json::from_value(json!({
            "id": "front",
            "name": "Front",
            "setupPrice": 25.00,
            "options": [{
                "id": "screen",
                "name": "Screen print",
                "priceTiers": [
                    { "quantityStart": 1, "quantityEnd": 49, "price": 1.20 },
                    { "quantityStart": 25, "quantityEnd": null, "price": 0.90 }
                ],
                "possibilities": [{ "id": "1c", "name": "1 colour" }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_cents_bounds() {
        assert!(validate_price_cents(0, "price").is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS, "price").is_ok());
        assert!(validate_price_cents(-1, "price").is_err());
        assert!(matches!(
            validate_price_cents(MAX_PRICE_CENTS + 1, "tier.price"),
            Err(ValidationError::OutOfRange { max, .. }) if max == MAX_PRICE_CENTS
        ));

        // the largest legal price at the largest legal quantity still fits
        assert!(MAX_PRICE_CENTS.checked_mul(MAX_ITEM_QUANTITY).is_some());
    }

    #[test]
    fn test_validate_multiplicator() {
        assert!(validate_multiplicator(0.0).is_ok());
        assert!(validate_multiplicator(1.8).is_ok());
        assert!(validate_multiplicator(-0.5).is_err());
        assert!(validate_multiplicator(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_price_tier() {
        assert!(validate_price_tier(&PriceTier::new(Some(0), None, Money::from_cents(0))).is_ok());
        assert!(validate_price_tier(&PriceTier::new(None, None, Money::from_cents(-1))).is_err());
        assert!(validate_price_tier(&PriceTier::new(Some(10), Some(9), Money::from_cents(5))).is_err());
        assert!(validate_price_tier(&PriceTier::new(Some(-1), None, Money::from_cents(5))).is_err());
    }

    #[test]
    fn test_overlapping_tiers_are_accepted() {
        assert!(validate_field(&field()).is_ok());
    }

    #[test]
    fn test_validate_field_rejects_negative_costs() {
        let mut field = field();
        field.film_price_cents = -100;
        assert!(validate_field(&field).is_err());
    }

    #[test]
    fn test_validate_catalog_rejects_duplicate_ids() {
        let result = validate_catalog(&[field(), field()]);
        assert!(matches!(result, Err(CoreError::DuplicateField(id)) if id == "front"));
    }

    #[test]
    fn test_validate_tax_rules() {
        use crate::types::TaxRate;

        let vat = TaxRule::new(TaxRate::from_bps(1900), "19%");
        assert!(validate_tax_rules(&[vat.clone()]).is_ok());
        assert!(validate_tax_rules(&[]).is_ok());

        let too_high = TaxRule::new(TaxRate::from_bps(12000), "120%");
        assert!(validate_tax_rules(&[vat.clone(), too_high]).is_err());

        let mut over_share = vat;
        over_share.percentage = 10001;
        assert!(validate_tax_rules(&[over_share]).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(1900).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }
}
