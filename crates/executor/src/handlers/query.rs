//! Read-only command handlers.

use lineage_core::{Result, SessionId, Timestamp};
use lineage_engine::Ledger;

use crate::command::Output;

// =============================================================================
// Operations
// =============================================================================

/// Handle ActiveOperations.
pub fn active_operations(ledger: &Ledger, session: &SessionId) -> Result<Output> {
    Ok(Output::Operations(ledger.active_operations(session)?))
}

/// Handle RevokedOperations.
pub fn revoked_operations(ledger: &Ledger, session: &SessionId) -> Result<Output> {
    Ok(Output::Revoked(ledger.revoked_operations(session)?))
}

/// Handle OperationHistory.
pub fn operation_history(ledger: &Ledger, session: &SessionId) -> Result<Output> {
    Ok(Output::History(ledger.operation_history(session)?))
}

/// Handle FusionTimeline.
pub fn fusion_timeline(ledger: &Ledger, session: &SessionId) -> Result<Output> {
    Ok(Output::Timeline(ledger.fusion_timeline(session)?))
}

// =============================================================================
// Snapshots
// =============================================================================

/// Handle LineageAt.
pub fn lineage_at(ledger: &Ledger, session: &SessionId, at: &Timestamp) -> Result<Output> {
    Ok(Output::Lineage(ledger.lineage_at(session, at)?))
}

/// Handle Snapshots.
pub fn snapshots(ledger: &Ledger, session: &SessionId) -> Result<Output> {
    Ok(Output::Snapshots(ledger.snapshots(session)?))
}

/// Handle LastSnapshot.
pub fn last_snapshot(ledger: &Ledger, session: &SessionId) -> Result<Output> {
    Ok(Output::LastSnapshot(ledger.last_snapshot(session)?))
}

// =============================================================================
// Audit
// =============================================================================

/// Handle Audit.
pub fn audit(ledger: &Ledger, session: &SessionId) -> Result<Output> {
    Ok(Output::Audit(ledger.audit(session)?))
}
