//! Integrity verification
//!
//! Two independent checks:
//!
//! - **content**: recomputing an entry's hash reproduces the stored one
//! - **chain**: within a session, each `prev_hash` is the predecessor's
//!   `content_hash`, starting from the genesis sentinel
//!
//! The raising forms (`verify_*`) stop at the first failure. The
//! [`IntegrityReport`] form collects failures instead and is what audits
//! embed.

use std::collections::HashMap;

use lineage_core::{CorruptionError, LedgerEntry, Result, SessionId, GENESIS_HASH};
use serde::Serialize;

/// Check one entry's content hash.
pub fn verify_entry(entry: &LedgerEntry) -> Result<()> {
    entry.verify_hash()
}

/// Check the content hashes and the chain of one session's entries, given
/// in append order.
pub fn verify_chain(session: &SessionId, entries: &[LedgerEntry]) -> Result<()> {
    let mut expected = GENESIS_HASH;
    for (position, entry) in entries.iter().enumerate() {
        verify_entry(entry)?;
        if entry.prev_hash != expected {
            return Err(CorruptionError::ChainBroken {
                session: session.to_string(),
                position,
                expected: expected.to_string(),
                found: entry.prev_hash.clone(),
            }
            .into());
        }
        expected = &entry.content_hash;
    }
    Ok(())
}

/// Check every entry and every session chain of a whole ledger, given in
/// append order.
pub fn verify_all(entries: &[LedgerEntry]) -> Result<()> {
    match IntegrityReport::check(entries).failures.into_iter().next() {
        Some(failure) => Err(failure.into()),
        None => Ok(()),
    }
}

/// Non-raising integrity result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Entries inspected
    pub entries_checked: usize,
    /// Sessions inspected
    pub sessions_checked: usize,
    /// Every failure found, in append order
    pub failures: Vec<CorruptionError>,
}

impl IntegrityReport {
    /// Inspect entries (one session or many) in append order.
    pub fn check(entries: &[LedgerEntry]) -> Self {
        let mut heads: HashMap<&SessionId, (usize, &str)> = HashMap::new();
        let mut failures = Vec::new();

        for entry in entries {
            if let Err(lineage_core::Error::Corruption(e)) = verify_entry(entry) {
                failures.push(e);
            }
            let (position, expected) = heads
                .get(&entry.session_id)
                .copied()
                .unwrap_or((0, GENESIS_HASH));
            if entry.prev_hash != expected {
                failures.push(CorruptionError::ChainBroken {
                    session: entry.session_id.to_string(),
                    position,
                    expected: expected.to_string(),
                    found: entry.prev_hash.clone(),
                });
            }
            heads.insert(&entry.session_id, (position + 1, &entry.content_hash));
        }

        IntegrityReport {
            entries_checked: entries.len(),
            sessions_checked: heads.len(),
            failures,
        }
    }

    /// True if nothing failed.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}
