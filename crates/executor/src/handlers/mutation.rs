//! Command handlers that may append.

use lineage_core::{Result, SessionId};
use lineage_engine::Ledger;

use crate::command::{Output, DEFAULT_REVOCATION_REASON};

/// Handle Snapshot.
pub fn snapshot(ledger: &Ledger, session: &SessionId, note: Option<String>) -> Result<Output> {
    Ok(Output::SnapshotTaken(ledger.snapshot(session, note)?))
}

/// Handle Revoke.
pub fn revoke(
    ledger: &Ledger,
    session: &SessionId,
    hash: &str,
    reason: Option<String>,
) -> Result<Output> {
    let reason = reason.unwrap_or_else(|| DEFAULT_REVOCATION_REASON.to_string());
    Ok(Output::Revocation(ledger.revoke(session, hash, reason)?))
}
