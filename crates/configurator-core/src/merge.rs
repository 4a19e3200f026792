//! # Cart Merge Policy
//!
//! Decides how a freshly added configured product is reconciled against the
//! cart, after the host has already done its naive same-id stacking.
//!
//! ## Decision Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  merged? │ line under raw id P │ I == P │ result                        │
//! │  ────────┼─────────────────────┼────────┼────────────────────────────── │
//! │  no      │ any                 │   -    │ Fresh: drop P, insert as I    │
//! │  yes     │ none                │   -    │ Fresh: insert as I            │
//! │  yes     │ present             │  yes   │ MergeTarget: restamp P        │
//! │  yes     │ present             │  no    │ SplitTarget: P -= Q, insert I │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `reconcile` does not touch a cart. It returns a [`CartPatch`], a small
//! list of operations the host applies in order. It runs exactly once per
//! add event, before pricing.
//!
//! The split arithmetic assumes the host merged quantities additively
//! before this runs (the existing line already contains Q).

use serde::{Deserialize, Serialize};

use crate::identity::{line_item_identity, ConfigurationHash};

// =============================================================================
// Inputs
// =============================================================================

/// The configured line item being added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingItem {
    /// Raw, pre-identity id the host used (usually the product id).
    pub raw_id: String,
    /// Product catalog id, if any.
    pub referenced_id: Option<String>,
    pub quantity: i64,
    pub hash: ConfigurationHash,
}

impl IncomingItem {
    /// Final identity: `<referenced id or raw id>-<hash>`.
    pub fn identity(&self) -> String {
        line_item_identity(self.referenced_id.as_deref(), &self.raw_id, &self.hash)
    }
}

/// The cart line currently stored under the incoming raw id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingLine {
    pub id: String,
    pub referenced_id: Option<String>,
    pub quantity: i64,
    /// Configuration hash previously stamped on the line, if any.
    pub hash: Option<ConfigurationHash>,
}

// =============================================================================
// Output
// =============================================================================

/// Which branch of the decision table was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeState {
    Fresh,
    MergeTarget,
    SplitTarget,
}

/// One cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CartOp {
    /// Remove the line stored under `id`.
    Remove { id: String },

    /// Set the quantity of the line stored under `id`.
    SetQuantity { id: String, quantity: i64 },

    /// Move the line stored under `from` to `to` (stacking if `to` exists).
    Rekey { from: String, to: String },

    /// Overwrite the configuration stamp of the existing line `id`.
    Restamp { id: String, hash: ConfigurationHash },

    /// Give the incoming item id `id`, stamp it and add it to the cart.
    InsertIncoming { id: String, hash: ConfigurationHash },
}

/// Ordered operations produced by one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPatch {
    pub state: MergeState,
    pub ops: Vec<CartOp>,
}

// =============================================================================
// Reconcile
// =============================================================================

/// Reconciles an incoming configured item against the line stored under its
/// raw id.
///
/// In the split branch the remaining existing line is moved to its own
/// configuration identity when it carries a hash, so both configurations
/// end up under canonical ids.
pub fn reconcile(existing: Option<&ExistingLine>, incoming: &IncomingItem, is_merged: bool) -> CartPatch {
    let identity = incoming.identity();
    let insert = CartOp::InsertIncoming {
        id: identity.clone(),
        hash: incoming.hash.clone(),
    };

    if !is_merged {
        return CartPatch {
            state: MergeState::Fresh,
            ops: vec![
                CartOp::Remove {
                    id: incoming.raw_id.clone(),
                },
                insert,
            ],
        };
    }

    let Some(existing) = existing else {
        return CartPatch {
            state: MergeState::Fresh,
            ops: vec![insert],
        };
    };

    if identity == incoming.raw_id {
        return CartPatch {
            state: MergeState::MergeTarget,
            ops: vec![CartOp::Restamp {
                id: existing.id.clone(),
                hash: incoming.hash.clone(),
            }],
        };
    }

    let mut ops = Vec::with_capacity(3);
    let remaining = existing.quantity - incoming.quantity;

    if remaining <= 0 {
        ops.push(CartOp::Remove {
            id: existing.id.clone(),
        });
    } else {
        ops.push(CartOp::SetQuantity {
            id: existing.id.clone(),
            quantity: remaining,
        });

        if let Some(hash) = &existing.hash {
            let own_identity = line_item_identity(existing.referenced_id.as_deref(), &existing.id, hash);
            if own_identity != existing.id {
                ops.push(CartOp::Rekey {
                    from: existing.id.clone(),
                    to: own_identity,
                });
            }
        }
    }

    ops.push(insert);

    CartPatch {
        state: MergeState::SplitTarget,
        ops,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming(raw_id: &str, quantity: i64, hash: &str) -> IncomingItem {
        IncomingItem {
            raw_id: raw_id.to_string(),
            referenced_id: Some("P".to_string()),
            quantity,
            hash: ConfigurationHash::from(hash),
        }
    }

    fn existing(id: &str, quantity: i64, hash: Option<&str>) -> ExistingLine {
        ExistingLine {
            id: id.to_string(),
            referenced_id: Some("P".to_string()),
            quantity,
            hash: hash.map(ConfigurationHash::from),
        }
    }

    #[test]
    fn test_not_merged_replaces_raw_line() {
        let patch = reconcile(None, &incoming("P", 1, "h1"), false);

        assert_eq!(patch.state, MergeState::Fresh);
        assert_eq!(
            patch.ops,
            vec![
                CartOp::Remove { id: "P".into() },
                CartOp::InsertIncoming {
                    id: "P-h1".into(),
                    hash: "h1".into()
                },
            ]
        );
    }

    #[test]
    fn test_merged_into_vanished_line_inserts() {
        let patch = reconcile(None, &incoming("P", 1, "h1"), true);

        assert_eq!(patch.state, MergeState::Fresh);
        assert_eq!(
            patch.ops,
            vec![CartOp::InsertIncoming {
                id: "P-h1".into(),
                hash: "h1".into()
            }]
        );
    }

    #[test]
    fn test_merged_into_same_identity_restamps() {
        let line = existing("P-h1", 2, Some("h1"));
        let patch = reconcile(Some(&line), &incoming("P-h1", 1, "h1"), true);

        assert_eq!(patch.state, MergeState::MergeTarget);
        assert_eq!(
            patch.ops,
            vec![CartOp::Restamp {
                id: "P-h1".into(),
                hash: "h1".into()
            }]
        );
    }

    #[test]
    fn test_split_keeps_remainder_under_its_own_identity() {
        let line = existing("P", 3, Some("h1"));
        let patch = reconcile(Some(&line), &incoming("P", 1, "h2"), true);

        assert_eq!(patch.state, MergeState::SplitTarget);
        assert_eq!(
            patch.ops,
            vec![
                CartOp::SetQuantity {
                    id: "P".into(),
                    quantity: 2
                },
                CartOp::Rekey {
                    from: "P".into(),
                    to: "P-h1".into()
                },
                CartOp::InsertIncoming {
                    id: "P-h2".into(),
                    hash: "h2".into()
                },
            ]
        );
    }

    #[test]
    fn test_split_without_remainder_removes_existing() {
        let line = existing("P", 1, Some("h1"));
        let patch = reconcile(Some(&line), &incoming("P", 1, "h2"), true);

        assert_eq!(
            patch.ops,
            vec![
                CartOp::Remove { id: "P".into() },
                CartOp::InsertIncoming {
                    id: "P-h2".into(),
                    hash: "h2".into()
                },
            ]
        );
    }

    #[test]
    fn test_split_of_unstamped_line_keeps_its_id() {
        let line = existing("P", 5, None);
        let patch = reconcile(Some(&line), &incoming("P", 2, "h2"), true);

        assert_eq!(patch.ops.len(), 2);
        assert_eq!(
            patch.ops[0],
            CartOp::SetQuantity {
                id: "P".into(),
                quantity: 3
            }
        );
    }
}
