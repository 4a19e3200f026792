//! # Domain Types
//!
//! Shared value types used by every pricing step.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    TaxRule      │   │    TaxState     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  tax_rate       │   │  Gross          │       │
//! │  │  1900 = 19%     │   │  percentage     │   │  Net            │       │
//! │  └─────────────────┘   │  name           │   │  Free           │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  TaxContext = TaxState + currency, supplied per request by the host    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. Rates come from a small fixed set of
/// configured tax rates, so merging tax collections by rate is exact
/// integer equality rather than a floating-point comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Tax Rule
// =============================================================================

/// Share of a line amount that is taxed at one rate.
///
/// Most products carry a single rule covering 100% of the amount. Mixed
/// products split the amount by `percentage` (basis points of the amount).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TaxRule {
    pub tax_rate: TaxRate,

    /// Share of the amount in basis points (10000 = 100%).
    #[serde(default = "full_share")]
    pub percentage: u32,

    /// Display label, e.g. "19% VAT".
    #[serde(default)]
    pub name: String,
}

fn full_share() -> u32 {
    10000
}

impl TaxRule {
    /// Creates a rule that applies the rate to the whole amount.
    pub fn new(tax_rate: TaxRate, name: impl Into<String>) -> Self {
        TaxRule {
            tax_rate,
            percentage: full_share(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Tax State
// =============================================================================

/// How prices in the current sales channel relate to taxes.
///
/// The same three-way branch is applied everywhere taxes are computed:
/// free → no taxes, net → tax on top, gross → tax contained in the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TaxState {
    /// Prices include tax (B2C storefronts).
    #[default]
    Gross,
    /// Prices exclude tax (B2B storefronts).
    Net,
    /// Tax-free delivery (e.g. export).
    Free,
}

impl fmt::Display for TaxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxState::Gross => write!(f, "gross"),
            TaxState::Net => write!(f, "net"),
            TaxState::Free => write!(f, "free"),
        }
    }
}

impl FromStr for TaxState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gross" => Ok(TaxState::Gross),
            "net" => Ok(TaxState::Net),
            "free" | "tax-free" | "tax_free" => Ok(TaxState::Free),
            _ => Err(ValidationError::NotAllowed {
                field: "tax_state".to_string(),
                allowed: vec!["gross".to_string(), "net".to_string(), "free".to_string()],
            }),
        }
    }
}

// =============================================================================
// Tax Context
// =============================================================================

/// Per-request tax context handed in by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxContext {
    pub tax_state: TaxState,

    /// ISO 4217 currency code (informational; all math is in minor units).
    pub currency: String,
}

impl TaxContext {
    pub fn new(tax_state: TaxState, currency: impl Into<String>) -> Self {
        TaxContext {
            tax_state,
            currency: currency.into(),
        }
    }
}

impl Default for TaxContext {
    fn default() -> Self {
        TaxContext::new(TaxState::Gross, "EUR")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1900);
        assert_eq!(rate.bps(), 1900);
        assert!((rate.percentage() - 19.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
        assert_eq!(TaxRate::from_percentage(7.0).bps(), 700);
    }

    #[test]
    fn test_tax_state_parsing() {
        assert_eq!("gross".parse::<TaxState>().unwrap(), TaxState::Gross);
        assert_eq!("NET".parse::<TaxState>().unwrap(), TaxState::Net);
        assert_eq!("tax-free".parse::<TaxState>().unwrap(), TaxState::Free);
        assert!("half".parse::<TaxState>().is_err());
    }

    #[test]
    fn test_tax_rule_defaults_to_full_share() {
        let rule: TaxRule = serde_json::from_value(serde_json::json!({ "taxRate": 1900 })).unwrap();
        assert_eq!(rule.percentage, 10000);
        assert_eq!(rule.name, "");
    }

    #[test]
    fn test_tax_state_default() {
        assert_eq!(TaxState::default(), TaxState::Gross);
    }
}
