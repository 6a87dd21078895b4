//! Lineage resolution
//!
//! The lineage of a session is a pure function of its entries:
//!
//! 1. collect every `revoked_hash` named by a REVOCATION entry
//! 2. drop OPERATION entries whose `content_hash` is in that set
//! 3. stable-sort the survivors by timestamp (ties keep append order)
//! 4. the lineage is the `after` of the last survivor, or the session's
//!    empty lineage when nothing survives
//!
//! Nothing here caches. Callers rescan the store and resolve again, so the
//! answer can never drift from what is on disk.

use std::collections::HashMap;

use lineage_core::{Lineage, LedgerEntry};

/// Map from revoked operation hash to the REVOCATION entry that revoked it.
///
/// When an operation was revoked more than once the earliest revocation
/// wins.
pub fn revocations(entries: &[LedgerEntry]) -> HashMap<&str, &LedgerEntry> {
    let mut revoked = HashMap::new();
    for entry in entries {
        if let Some(revocation) = entry.as_revocation() {
            revoked
                .entry(revocation.revoked_hash.as_str())
                .or_insert(entry);
        }
    }
    revoked
}

/// Operations that are not revoked, in resolution order.
pub fn surviving_operations(entries: &[LedgerEntry]) -> Vec<&LedgerEntry> {
    let revoked = revocations(entries);
    let mut survivors: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.as_operation().is_some())
        .filter(|e| !revoked.contains_key(e.content_hash.as_str()))
        .collect();
    // `sort_by` is stable: equal timestamps keep their append position.
    survivors.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    survivors
}

/// Resolve the current lineage of a session.
pub fn resolve(entries: &[LedgerEntry], initial_fusion_path: &[u8]) -> Lineage {
    surviving_operations(entries)
        .last()
        .and_then(|entry| entry.as_operation())
        .map(|op| op.after.clone())
        .unwrap_or_else(|| Lineage::empty(initial_fusion_path.to_vec()))
}
