//! Read-only queries over a session's entries
//!
//! Every function here is pure: same entries in, same answer out. The
//! [`crate::Ledger`] facade scans the store and hands the session's
//! entries in append order.

use std::collections::{HashMap, HashSet};

use lineage_core::{EntryKind, LedgerEntry, Lineage, SessionId, Timestamp};
use serde::Serialize;

use crate::integrity::IntegrityReport;
use crate::resolver;

/// An operation together with the revocation that excluded it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevokedOperation {
    /// The revoked OPERATION entry
    pub operation: LedgerEntry,
    /// Content hash of the REVOCATION entry
    pub revoked_by: String,
    /// Reason given at revocation
    pub reason: String,
    /// When it was revoked
    pub revoked_at: Timestamp,
}

/// One point of the fusion timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    /// Operation timestamp
    pub timestamp: Timestamp,
    /// Operation content hash
    pub hash: String,
    /// Fusion vector after the operation
    pub fusion_path: Vec<u8>,
}

/// Summary of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    /// Audited session
    pub session: SessionId,
    /// OPERATION entries
    pub total_operations: usize,
    /// OPERATION entries not revoked
    pub active_operations: usize,
    /// REVOCATION entries
    pub revocations: usize,
    /// SNAPSHOT entries
    pub snapshots: usize,
    /// Content and chain check of the session
    pub integrity: IntegrityReport,
    /// Resolved lineage
    pub lineage: Lineage,
}

/// Operations that are not revoked, in resolution order.
pub fn active_operations(entries: &[LedgerEntry]) -> Vec<LedgerEntry> {
    resolver::surviving_operations(entries)
        .into_iter()
        .cloned()
        .collect()
}

/// Revoked operations in the order they were revoked.
///
/// Only the earliest revocation of an operation counts; later duplicates
/// and revocations naming no operation of the session are skipped.
pub fn revoked_operations(entries: &[LedgerEntry]) -> Vec<RevokedOperation> {
    let operations: HashMap<&str, &LedgerEntry> = entries
        .iter()
        .filter(|e| e.as_operation().is_some())
        .map(|e| (e.content_hash.as_str(), e))
        .collect();
    let mut seen = HashSet::new();

    entries
        .iter()
        .filter_map(|revocation| {
            let payload = revocation.as_revocation()?;
            let operation = operations.get(payload.revoked_hash.as_str())?;
            if !seen.insert(payload.revoked_hash.as_str()) {
                return None;
            }
            Some(RevokedOperation {
                operation: (*operation).clone(),
                revoked_by: revocation.content_hash.clone(),
                reason: payload.reason.clone(),
                revoked_at: revocation.timestamp.clone(),
            })
        })
        .collect()
}

/// OPERATION and REVOCATION entries interleaved in append order.
pub fn operation_history(entries: &[LedgerEntry]) -> Vec<LedgerEntry> {
    entries
        .iter()
        .filter(|e| e.as_operation().is_some() || e.as_revocation().is_some())
        .cloned()
        .collect()
}

/// `(timestamp, fusion_path)` of each surviving operation, in resolution
/// order.
pub fn fusion_timeline(entries: &[LedgerEntry]) -> Vec<TimelinePoint> {
    resolver::surviving_operations(entries)
        .into_iter()
        .filter_map(|entry| {
            entry.as_operation().map(|op| TimelinePoint {
                timestamp: entry.timestamp.clone(),
                hash: entry.content_hash.clone(),
                fusion_path: op.after.fusion_path.clone(),
            })
        })
        .collect()
}

/// Counts, integrity and resolved lineage of a session.
pub fn audit(
    session: &SessionId,
    entries: &[LedgerEntry],
    initial_fusion_path: &[u8],
) -> AuditReport {
    let mut report = AuditReport {
        session: session.clone(),
        total_operations: 0,
        active_operations: resolver::surviving_operations(entries).len(),
        revocations: 0,
        snapshots: 0,
        integrity: IntegrityReport::check(entries),
        lineage: resolver::resolve(entries, initial_fusion_path),
    };
    for entry in entries {
        match entry.kind() {
            EntryKind::Operation => report.total_operations += 1,
            EntryKind::Revocation => report.revocations += 1,
            EntryKind::Snapshot => report.snapshots += 1,
        }
    }
    report
}
