//! Snapshots
//!
//! A snapshot is an advisory cache: the resolved lineage of a session at
//! the time it was taken, plus entry counters. Nothing reads a snapshot to
//! answer "what is the lineage now"; that is always resolved from the log.
//! Snapshots answer "what was the lineage at time T".
//!
//! ## Point-in-time lookups
//!
//! [`lineage_at`] walks the session forward and stops at the first entry
//! newer than T, so it never reads past the answer. If no snapshot was
//! taken at or before T the lookup fails with `NotFound`. It never falls
//! back to the empty lineage, which would be indistinguishable from a
//! genuinely empty session.

use lineage_core::{
    Error, LedgerEntry, LineageState, Result, SessionId, SnapshotPayload, Timestamp,
};
use serde::Serialize;

use crate::resolver;

/// Build the payload of a new snapshot from a session's entries.
pub fn capture(
    entries: &[LedgerEntry],
    initial_fusion_path: &[u8],
    note: Option<String>,
) -> SnapshotPayload {
    let lineage = resolver::resolve(entries, initial_fusion_path);
    let total_operations = entries.iter().filter(|e| e.as_operation().is_some()).count();
    let revocations = entries.iter().filter(|e| e.as_revocation().is_some()).count();
    let active_operations = resolver::surviving_operations(entries).len();

    SnapshotPayload {
        lineage_state: LineageState::new(lineage, note),
        total_operations: total_operations as u64,
        active_operations: active_operations as u64,
        revocations: revocations as u64,
    }
}

/// A SNAPSHOT entry as returned by queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRecord {
    /// When it was taken
    pub timestamp: Timestamp,
    /// Content hash of the SNAPSHOT entry
    pub hash: String,
    /// Captured state and counters
    #[serde(flatten)]
    pub snapshot: SnapshotPayload,
}

impl SnapshotRecord {
    fn from_entry(entry: &LedgerEntry) -> Option<Self> {
        entry.as_snapshot().map(|snapshot| SnapshotRecord {
            timestamp: entry.timestamp.clone(),
            hash: entry.content_hash.clone(),
            snapshot: snapshot.clone(),
        })
    }
}

/// Every snapshot of a session, oldest first.
pub fn snapshots(entries: &[LedgerEntry]) -> Vec<SnapshotRecord> {
    entries.iter().filter_map(SnapshotRecord::from_entry).collect()
}

/// The most recent snapshot of a session.
pub fn last_snapshot(entries: &[LedgerEntry]) -> Option<SnapshotRecord> {
    entries.iter().rev().find_map(SnapshotRecord::from_entry)
}

/// Lineage captured by the latest snapshot taken at or before `at`.
///
/// `entries` must be the session's entries in append order; iteration
/// stops at the first entry newer than `at`.
pub fn lineage_at<I>(session: &SessionId, entries: I, at: &Timestamp) -> Result<LineageState>
where
    I: IntoIterator<Item = Result<LedgerEntry>>,
{
    let mut latest = None;
    for entry in entries {
        let entry = entry?;
        if &entry.timestamp > at {
            break;
        }
        if let Some(snapshot) = entry.as_snapshot() {
            latest = Some(snapshot.lineage_state.clone());
        }
    }
    latest.ok_or_else(|| {
        Error::NotFound(format!(
            "no snapshot available for session '{}' at or before {}",
            session, at
        ))
    })
}
