//! The ledger facade
//!
//! [`Ledger`] is the single authoritative pairing of the store with the
//! resolver. Every mutation goes through it:
//!
//! - `append_operation`: validate, then append
//! - `revoke`: check the target exists and is live, then append
//! - `snapshot`: resolve, then append
//!
//! Each of these holds the store's writer for the whole check-then-append
//! sequence, so either every check passes and one entry is written, or
//! nothing is written.
//!
//! The store itself stays private: callers get its recovery report and
//! read accessors, never its writer.
//!
//! Queries never take the writer. They rescan the session and evaluate a
//! pure function from [`crate::query`], [`crate::snapshot`] or
//! [`crate::resolver`].

use std::path::Path;
use std::sync::Arc;

use lineage_core::{
    Attestation, EntryBody, EntryDraft, Error, LedgerEntry, Lineage, LineageState,
    OperationPayload, Result, RevocationConflict, RevocationPayload, SessionId, Timestamp, Word,
};
use lineage_storage::{LedgerStore, RecoveryReport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::integrity::{self, IntegrityReport};
use crate::query::{self, AuditReport, RevokedOperation, TimelinePoint};
use crate::resolver;
use crate::snapshot::{self, SnapshotRecord};
use crate::validator;

/// Result of a revocation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RevokeOutcome {
    /// A REVOCATION entry was appended
    Revoked {
        /// The appended entry
        entry: LedgerEntry,
    },
    /// Nothing was appended
    NoOp {
        /// Why
        conflict: RevocationConflict,
    },
}

impl RevokeOutcome {
    /// True if a revocation was appended.
    pub fn is_revoked(&self) -> bool {
        matches!(self, RevokeOutcome::Revoked { .. })
    }
}

/// Tamper-evident lineage ledger over one store file.
pub struct Ledger {
    store: LedgerStore,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Open the ledger described by `config`.
    pub fn open(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let store = LedgerStore::open(&config.path, config.store_options())?;
        info!(
            path = %config.path.display(),
            access = ?config.access_mode,
            durability = config.durability.description(),
            "ledger ready"
        );
        Ok(Ledger {
            store,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock that timestamps new entries.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Configuration in effect.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Ledger file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// What opening the ledger found on disk.
    pub fn recovery(&self) -> &RecoveryReport {
        self.store.recovery()
    }

    /// Whether mutations are refused.
    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    /// Number of valid entries across all sessions.
    pub fn entry_count(&self) -> Result<usize> {
        self.store.len()
    }

    /// Every entry of every session in append order.
    pub fn all_entries(&self) -> Result<Vec<LedgerEntry>> {
        self.store.scan(None)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Validate and append an operation.
    ///
    /// On any validation failure nothing is written and the specific
    /// [`lineage_core::ValidationError`] is returned.
    pub fn append_operation(
        &self,
        session: &SessionId,
        word: Word,
        before: Lineage,
        after: Lineage,
        attestation: Option<Attestation>,
    ) -> Result<LedgerEntry> {
        let mut writer = self.store.writer()?;
        let profile = self.config.profile(session)?;

        if let Err(e) =
            validator::validate(profile, &word, &before, &after, attestation.as_ref())
        {
            warn!(session = %session, word = %word, error = %e, "operation rejected");
            return Err(e.into());
        }

        let draft = EntryDraft::new(
            session.clone(),
            self.clock.now(),
            EntryBody::Operation(OperationPayload {
                word,
                before,
                after,
                attestation,
            }),
        );
        let entry = writer.append(draft)?;
        info!(session = %session, hash = %entry.content_hash, "operation appended");
        Ok(entry)
    }

    /// Permanently exclude an operation from resolution.
    ///
    /// Revoking a hash that names no operation of the session, or one that
    /// is already revoked, appends nothing and reports the conflict.
    pub fn revoke(
        &self,
        session: &SessionId,
        revoked_hash: &str,
        reason: impl Into<String>,
    ) -> Result<RevokeOutcome> {
        let mut writer = self.store.writer()?;
        let entries = self.store.scan(Some(session))?;

        let exists = entries
            .iter()
            .any(|e| e.as_operation().is_some() && e.content_hash == revoked_hash);
        let conflict = if !exists {
            Some(RevocationConflict::UnknownOperation {
                hash: revoked_hash.to_string(),
            })
        } else {
            resolver::revocations(&entries)
                .get(revoked_hash)
                .map(|by| RevocationConflict::AlreadyRevoked {
                    hash: revoked_hash.to_string(),
                    revoked_by: by.content_hash.clone(),
                })
        };
        if let Some(conflict) = conflict {
            warn!(session = %session, %conflict, "revocation ignored");
            return Ok(RevokeOutcome::NoOp { conflict });
        }

        let draft = EntryDraft::new(
            session.clone(),
            self.clock.now(),
            EntryBody::Revocation(RevocationPayload {
                revoked_hash: revoked_hash.to_string(),
                reason: reason.into(),
            }),
        );
        let entry = writer.append(draft)?;
        info!(session = %session, revoked = revoked_hash, "operation revoked");
        Ok(RevokeOutcome::Revoked { entry })
    }

    /// Resolve the session and record the result as a SNAPSHOT entry.
    pub fn snapshot(&self, session: &SessionId, note: Option<String>) -> Result<LedgerEntry> {
        let mut writer = self.store.writer()?;
        let profile = self.config.profile(session)?;
        let entries = self.store.scan(Some(session))?;
        let payload = snapshot::capture(&entries, &profile.initial_fusion_path, note);

        let draft = EntryDraft::new(session.clone(), self.clock.now(), EntryBody::Snapshot(payload));
        let entry = writer.append(draft)?;
        info!(session = %session, hash = %entry.content_hash, "snapshot taken");
        Ok(entry)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Entries of a session in append order.
    pub fn entries(&self, session: &SessionId) -> Result<Vec<LedgerEntry>> {
        self.store.scan(Some(session))
    }

    /// Sessions present in the ledger, in order of first appearance.
    pub fn sessions(&self) -> Result<Vec<SessionId>> {
        self.store.sessions()
    }

    /// Current lineage of a session.
    pub fn lineage(&self, session: &SessionId) -> Result<Lineage> {
        let profile = self.config.profile(session)?;
        let entries = self.entries(session)?;
        Ok(resolver::resolve(&entries, &profile.initial_fusion_path))
    }

    /// Lineage recorded by the latest snapshot at or before `at`.
    pub fn lineage_at(&self, session: &SessionId, at: &Timestamp) -> Result<LineageState> {
        debug!(session = %session, at = %at, "point-in-time lookup");
        snapshot::lineage_at(session, self.store.iter(Some(session))?, at)
    }

    /// Every snapshot of a session.
    pub fn snapshots(&self, session: &SessionId) -> Result<Vec<SnapshotRecord>> {
        Ok(snapshot::snapshots(&self.entries(session)?))
    }

    /// Most recent snapshot of a session.
    pub fn last_snapshot(&self, session: &SessionId) -> Result<SnapshotRecord> {
        snapshot::last_snapshot(&self.entries(session)?).ok_or_else(|| {
            Error::NotFound(format!("no snapshot available for session '{}'", session))
        })
    }

    /// Operations not revoked.
    pub fn active_operations(&self, session: &SessionId) -> Result<Vec<LedgerEntry>> {
        Ok(query::active_operations(&self.entries(session)?))
    }

    /// Operations that were revoked, with their revocations.
    pub fn revoked_operations(&self, session: &SessionId) -> Result<Vec<RevokedOperation>> {
        Ok(query::revoked_operations(&self.entries(session)?))
    }

    /// Operations and revocations in append order.
    pub fn operation_history(&self, session: &SessionId) -> Result<Vec<LedgerEntry>> {
        Ok(query::operation_history(&self.entries(session)?))
    }

    /// Fusion vector after each surviving operation.
    pub fn fusion_timeline(&self, session: &SessionId) -> Result<Vec<TimelinePoint>> {
        Ok(query::fusion_timeline(&self.entries(session)?))
    }

    /// Counts, integrity and lineage of a session.
    pub fn audit(&self, session: &SessionId) -> Result<AuditReport> {
        let profile = self.config.profile(session)?;
        let entries = self.entries(session)?;
        Ok(query::audit(session, &entries, &profile.initial_fusion_path))
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Check one session's hashes and chain, failing on the first break.
    pub fn verify_session(&self, session: &SessionId) -> Result<()> {
        integrity::verify_chain(session, &self.entries(session)?)
    }

    /// Check every entry and every chain of the ledger.
    pub fn verify(&self) -> Result<IntegrityReport> {
        let entries = self.store.scan(None)?;
        let report = IntegrityReport::check(&entries);
        if report.is_valid() {
            info!(entries = report.entries_checked, "ledger verified");
        } else {
            warn!(failures = report.failures.len(), "ledger failed verification");
        }
        Ok(report)
    }
}
