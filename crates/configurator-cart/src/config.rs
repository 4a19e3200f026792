//! # Configurator Configuration
//!
//! Runtime settings for the cart integration layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CONFIGURATOR_TAX_STATE=net                                         │
//! │     CONFIGURATOR_CURRENCY=CHF                                          │
//! │     CONFIGURATOR_MAX_FIELDS=20                                         │
//! │     CONFIGURATOR_SELECTION_KEY=productConfigurator                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/configurator/configurator.toml (Linux)                   │
//! │     ~/Library/Application Support/com.configurator.cart/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # configurator.toml
//! [payload]
//! selection_key = "productConfigurator"
//! applied_key = "productConfiguratorApplied"
//! hash_key = "configuratorHash"
//! base_price_key = "configuratorBasePrice"
//!
//! [catalog]
//! max_fields = 50
//!
//! [pricing]
//! tax_state = "gross"  # gross | net | free
//! currency = "EUR"
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use configurator_core::{TaxContext, TaxState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

// =============================================================================
// Payload Keys
// =============================================================================

/// Line item payload keys the configurator reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadKeys {
    /// Raw selection as submitted by the shopper. Stripped by the collector.
    #[serde(default = "default_selection_key")]
    pub selection_key: String,

    /// Selection applied by the last pricing pass, used on re-collection.
    #[serde(default = "default_applied_key")]
    pub applied_key: String,

    /// Configuration hash stamped when the item was added.
    #[serde(default = "default_hash_key")]
    pub hash_key: String,

    /// `{unit, total}` of the product before option surcharges.
    #[serde(default = "default_base_price_key")]
    pub base_price_key: String,
}

fn default_selection_key() -> String {
    "productConfigurator".to_string()
}

fn default_applied_key() -> String {
    "productConfiguratorApplied".to_string()
}

fn default_hash_key() -> String {
    "configuratorHash".to_string()
}

fn default_base_price_key() -> String {
    "configuratorBasePrice".to_string()
}

impl Default for PayloadKeys {
    fn default() -> Self {
        PayloadKeys {
            selection_key: default_selection_key(),
            applied_key: default_applied_key(),
            hash_key: default_hash_key(),
            base_price_key: default_base_price_key(),
        }
    }
}

impl PayloadKeys {
    fn all(&self) -> [&str; 4] {
        [
            self.selection_key.as_str(),
            self.applied_key.as_str(),
            self.hash_key.as_str(),
            self.base_price_key.as_str(),
        ]
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// Catalog lookup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Maximum number of fields loaded per product.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
}

fn default_max_fields() -> usize {
    50
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            max_fields: default_max_fields(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Sales channel pricing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub tax_state: TaxState,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_state: TaxState::default(),
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configurator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    #[serde(default)]
    pub payload: PayloadKeys,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl ConfiguratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (configurator.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading configurator config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load configurator config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Configurator config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        let keys = self.payload.all();

        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(CartError::InvalidConfig("payload keys must not be empty".into()));
        }

        let unique: HashSet<&str> = keys.iter().copied().collect();
        if unique.len() != keys.len() {
            return Err(CartError::InvalidConfig("payload keys must be distinct".into()));
        }

        if self.catalog.max_fields == 0 {
            return Err(CartError::InvalidConfig(
                "max_fields must be greater than 0".into(),
            ));
        }

        if self.pricing.currency.trim().is_empty() {
            return Err(CartError::InvalidConfig("currency must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(state) = lookup("CONFIGURATOR_TAX_STATE") {
            match state.parse() {
                Ok(parsed) => {
                    debug!(tax_state = %state, "Overriding tax state from environment");
                    self.pricing.tax_state = parsed;
                }
                Err(_) => warn!(tax_state = %state, "Unknown tax state in environment"),
            }
        }

        if let Some(currency) = lookup("CONFIGURATOR_CURRENCY") {
            self.pricing.currency = currency;
        }

        if let Some(max) = lookup("CONFIGURATOR_MAX_FIELDS") {
            if let Ok(n) = max.parse::<usize>() {
                debug!(max_fields = n, "Overriding max fields from environment");
                self.catalog.max_fields = n;
            }
        }

        if let Some(key) = lookup("CONFIGURATOR_SELECTION_KEY") {
            self.payload.selection_key = key;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "configurator", "cart")
            .map(|dirs| dirs.config_dir().join("configurator.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Tax context for a cart pass.
    pub fn tax_context(&self) -> TaxContext {
        TaxContext::new(self.pricing.tax_state, self.pricing.currency.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ConfiguratorConfig::default();
        assert_eq!(config.payload.selection_key, "productConfigurator");
        assert_eq!(config.payload.hash_key, "configuratorHash");
        assert_eq!(config.catalog.max_fields, 50);
        assert_eq!(config.pricing.tax_state, TaxState::Gross);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ConfiguratorConfig::default();

        config.catalog.max_fields = 0;
        assert!(config.validate().is_err());

        config.catalog.max_fields = 10;
        config.payload.applied_key = config.payload.selection_key.clone();
        assert!(config.validate().is_err());

        config.payload.applied_key = "  ".to_string();
        assert!(config.validate().is_err());

        config.payload.applied_key = "applied".to_string();
        config.pricing.currency = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ConfiguratorConfig = toml::from_str(
            r#"
            [pricing]
            tax_state = "net"

            [catalog]
            max_fields = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.tax_state, TaxState::Net);
        assert_eq!(config.pricing.currency, "EUR");
        assert_eq!(config.catalog.max_fields, 12);
        assert_eq!(config.payload, PayloadKeys::default());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CONFIGURATOR_TAX_STATE", "tax-free"),
            ("CONFIGURATOR_CURRENCY", "CHF"),
            ("CONFIGURATOR_MAX_FIELDS", "7"),
            ("CONFIGURATOR_SELECTION_KEY", "config"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfiguratorConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.pricing.tax_state, TaxState::Free);
        assert_eq!(config.pricing.currency, "CHF");
        assert_eq!(config.catalog.max_fields, 7);
        assert_eq!(config.payload.selection_key, "config");
        assert_eq!(config.tax_context().currency, "CHF");
    }

    #[test]
    fn test_unknown_tax_state_override_is_ignored() {
        let mut config = ConfiguratorConfig::default();
        config.apply_overrides(|key| (key == "CONFIGURATOR_TAX_STATE").then(|| "maybe".to_string()));
        assert_eq!(config.pricing.tax_state, TaxState::Gross);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("configurator-{}", uuid::Uuid::new_v4()))
            .join("configurator.toml");

        let mut config = ConfiguratorConfig::default();
        config.pricing.currency = "USD".to_string();
        config.save(Some(path.clone())).unwrap();

        let loaded: ConfiguratorConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_or_default_falls_back_on_invalid_file() {
        let dir = std::env::temp_dir().join(format!("configurator-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("configurator.toml");
        std::fs::write(&path, "[catalog]\nmax_fields = \"many\"\n").unwrap();

        let config = ConfiguratorConfig::load_or_default(Some(path));
        assert_eq!(config.catalog.max_fields, 50);

        let _ = std::fs::remove_dir_all(dir);
    }
}
