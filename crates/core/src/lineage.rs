//! Lineage state
//!
//! A lineage is never stored as mutable state. It is always derived from
//! the entries of a session; the types here are the values that derivation
//! produces and that operations carry in their `before`/`after` fields.

use serde::{Deserialize, Serialize};

/// Resolved logical state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lineage {
    /// Ordered, opaque event identifiers
    pub events_order: Vec<String>,
    /// Fixed-length structural state vector
    pub fusion_path: Vec<u8>,
}

impl Lineage {
    /// Create a lineage.
    pub fn new<I, S>(events_order: I, fusion_path: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Lineage {
            events_order: events_order.into_iter().map(Into::into).collect(),
            fusion_path,
        }
    }

    /// The canonical empty lineage of a session: no events, the session's
    /// initial fusion vector.
    pub fn empty(initial_fusion_path: Vec<u8>) -> Self {
        Lineage {
            events_order: Vec::new(),
            fusion_path: initial_fusion_path,
        }
    }
}

/// A lineage as captured by a snapshot, with an optional note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageState {
    /// Captured lineage
    #[serde(flatten)]
    pub lineage: Lineage,
    /// Free-text note supplied when the snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LineageState {
    /// Wrap a lineage with an optional note.
    pub fn new(lineage: Lineage, note: Option<String>) -> Self {
        LineageState { lineage, note }
    }
}
