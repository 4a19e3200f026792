//! # Configuration Identity
//!
//! Turns a selection into a stable digest so identical configurations of
//! the same product stack in the cart and different ones stay separate.
//!
//! ## Derivation
//! ```text
//! selection {b: "2", a: "1"}
//!      │  keys in byte order (BTreeMap)
//!      ▼
//! {"a":"1","b":"2"}            compact JSON, no extra whitespace
//!      │  SHA-256, first 32 hex chars
//!      ▼
//! 21f76dfbfe6dfe21f762080ef484112c
//!      │
//!      ▼
//! "<product id>-21f76dfbfe6dfe21f762080ef484112c"   line item id
//! ```
//!
//! The digest is a deduplication key, not a security boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use ts_rs::TS;

use crate::catalog::Selection;
use crate::error::CoreResult;

/// Hex characters kept from the digest.
pub const HASH_LENGTH: usize = 32;

/// Canonical digest of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ConfigurationHash(String);

impl ConfigurationHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigurationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigurationHash {
    fn from(value: &str) -> Self {
        ConfigurationHash(value.to_string())
    }
}

/// Computes the configuration hash of a selection.
///
/// Returns `Ok(None)` for an empty selection ("no identity"). An encoding
/// failure is returned as an error so the caller can leave the line item
/// untouched.
///
/// ## Example
/// ```rust
/// use configurator_core::catalog::Selection;
/// use configurator_core::identity::compute_hash;
///
/// let a: Selection = [("a", "1"), ("b", "2")].into_iter().collect();
/// let b: Selection = [("b", "2"), ("a", "1")].into_iter().collect();
/// assert_eq!(compute_hash(&a).unwrap(), compute_hash(&b).unwrap());
/// ```
pub fn compute_hash(selection: &Selection) -> CoreResult<Option<ConfigurationHash>> {
    if selection.is_empty() {
        return Ok(None);
    }

    let encoded = serde_json::to_vec(selection)?;
    let digest = format!("{:x}", Sha256::digest(&encoded));

    Ok(Some(ConfigurationHash(digest[..HASH_LENGTH].to_string())))
}

/// Builds the cart line item id for a configured product.
///
/// The base is the product's catalog id, falling back to the line item's
/// own id when it carries no catalog reference.
pub fn line_item_identity(
    referenced_id: Option<&str>,
    line_item_id: &str,
    hash: &ConfigurationHash,
) -> String {
    let base = referenced_id.unwrap_or(line_item_id);
    format!("{}-{}", base, hash)
}

// =============================================================================
// Unit Tests
// =============================================================================
