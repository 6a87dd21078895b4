//! Command and Output enums
//!
//! A parsed statement binds one-to-one to a [`Command`]; executing it
//! yields one [`Output`]. Both are plain data so they can be logged,
//! serialized and compared in tests.
//!
//! Every command carries an optional session. `None` means "the session
//! the executor was given as default", the way a shell falls back to its
//! current session when `FOR` is omitted.

use lineage_core::{LedgerEntry, LineageState, SessionId, Timestamp};
use lineage_engine::{AuditReport, RevokeOutcome, RevokedOperation, SnapshotRecord, TimelinePoint};
use serde::Serialize;

/// Reason recorded when `REVOKE` is given no `NOTE`.
pub const DEFAULT_REVOCATION_REASON: &str = "sovereign_recoil";

/// A ledger command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// `SHOW ACTIVE OPERATIONS`
    ActiveOperations {
        /// Target session
        session: Option<SessionId>,
    },
    /// `SHOW REVOKED OPERATIONS`
    RevokedOperations {
        /// Target session
        session: Option<SessionId>,
    },
    /// `SHOW OPERATION HISTORY`
    OperationHistory {
        /// Target session
        session: Option<SessionId>,
    },
    /// `SHOW FUSION TIMELINE`
    FusionTimeline {
        /// Target session
        session: Option<SessionId>,
    },
    /// `SHOW LINEAGE AT "<ts>"`
    LineageAt {
        /// Target session
        session: Option<SessionId>,
        /// Point in time
        at: Timestamp,
    },
    /// `SHOW SNAPSHOTS`
    Snapshots {
        /// Target session
        session: Option<SessionId>,
    },
    /// `SHOW LAST SNAPSHOT`
    LastSnapshot {
        /// Target session
        session: Option<SessionId>,
    },
    /// `AUDIT SESSION`
    Audit {
        /// Target session
        session: Option<SessionId>,
    },
    /// `SNAPSHOT LINEAGE [NOTE "..."]`
    Snapshot {
        /// Target session
        session: Option<SessionId>,
        /// Free-text note
        note: Option<String>,
    },
    /// `REVOKE <hash> [NOTE "..."]`
    Revoke {
        /// Target session
        session: Option<SessionId>,
        /// Content hash of the operation
        hash: String,
        /// Reason; defaults to [`DEFAULT_REVOCATION_REASON`]
        reason: Option<String>,
    },
}

impl Command {
    /// Session named by the command, if any.
    pub fn session(&self) -> Option<&SessionId> {
        match self {
            Command::ActiveOperations { session }
            | Command::RevokedOperations { session }
            | Command::OperationHistory { session }
            | Command::FusionTimeline { session }
            | Command::LineageAt { session, .. }
            | Command::Snapshots { session }
            | Command::LastSnapshot { session }
            | Command::Audit { session }
            | Command::Snapshot { session, .. }
            | Command::Revoke { session, .. } => session.as_ref(),
        }
    }

    /// Statement keywords, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ActiveOperations { .. } => "SHOW ACTIVE OPERATIONS",
            Command::RevokedOperations { .. } => "SHOW REVOKED OPERATIONS",
            Command::OperationHistory { .. } => "SHOW OPERATION HISTORY",
            Command::FusionTimeline { .. } => "SHOW FUSION TIMELINE",
            Command::LineageAt { .. } => "SHOW LINEAGE",
            Command::Snapshots { .. } => "SHOW SNAPSHOTS",
            Command::LastSnapshot { .. } => "SHOW LAST SNAPSHOT",
            Command::Audit { .. } => "AUDIT",
            Command::Snapshot { .. } => "SNAPSHOT",
            Command::Revoke { .. } => "REVOKE",
        }
    }

    /// Whether executing the command may append an entry.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Command::Snapshot { .. } | Command::Revoke { .. })
    }
}

/// Result of executing a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "output", content = "data", rename_all = "snake_case")]
pub enum Output {
    /// Active operations
    Operations(Vec<LedgerEntry>),
    /// Revoked operations with their revocations
    Revoked(Vec<RevokedOperation>),
    /// Operations and revocations in append order
    History(Vec<LedgerEntry>),
    /// Fusion vector per surviving operation
    Timeline(Vec<TimelinePoint>),
    /// Lineage recorded by a snapshot
    Lineage(LineageState),
    /// Snapshot listing
    Snapshots(Vec<SnapshotRecord>),
    /// A single snapshot
    LastSnapshot(SnapshotRecord),
    /// Session audit
    Audit(AuditReport),
    /// A snapshot entry was appended
    SnapshotTaken(LedgerEntry),
    /// Outcome of a revocation request
    Revocation(RevokeOutcome),
}
