//! Ledger entries
//!
//! Entries are immutable records in an append-only log. Each entry carries:
//! - the session it belongs to
//! - a timestamp (non-decreasing in append order)
//! - a kind-specific payload ([`EntryBody`])
//! - the content hash of its session predecessor (`prev_hash`)
//! - its own content hash
//!
//! The kind is a closed set. Every consumer matches on [`EntryBody`]
//! exhaustively; there is no "unknown kind" branch.
//!
//! On disk an entry is one JSON object per line:
//!
//! ```text
//! {"session_id":"s1","timestamp":"2025-12-25T21:00:00.000000Z","kind":"OPERATION",
//!  "payload":{...},"prev_hash":"000...","content_hash":"9f2c..."}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CorruptionError, Result};
use crate::hash::content_hash;
use crate::lineage::{Lineage, LineageState};
use crate::timestamp::Timestamp;
use crate::types::SessionId;
use crate::word::Word;

/// Kind tag of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// State transition
    Operation,
    /// Permanent exclusion of a prior operation
    Revocation,
    /// Cached resolution result
    Snapshot,
}

impl EntryKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Operation => "OPERATION",
            EntryKind::Revocation => "REVOCATION",
            EntryKind::Snapshot => "SNAPSHOT",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque value supplied by an external producer alongside an operation.
///
/// The ledger checks the declared shape (required keys, numeric ranges) but
/// never interprets the numbers or the digest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    /// Provenance / consent digest
    pub digest: String,
    /// Named numeric readings
    #[serde(default)]
    pub summary: BTreeMap<String, f64>,
}

/// Payload of an OPERATION entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationPayload {
    /// Transition applied
    pub word: Word,
    /// Lineage the word was applied to
    pub before: Lineage,
    /// Lineage asserted as the result
    pub after: Lineage,
    /// External attestation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<Attestation>,
}

/// Payload of a REVOCATION entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationPayload {
    /// Content hash of the revoked OPERATION entry
    pub revoked_hash: String,
    /// Free-text reason
    pub reason: String,
}

/// Payload of a SNAPSHOT entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// Resolved lineage at snapshot time
    pub lineage_state: LineageState,
    /// OPERATION entries in the session
    pub total_operations: u64,
    /// OPERATION entries not revoked
    pub active_operations: u64,
    /// REVOCATION entries in the session
    pub revocations: u64,
}

/// Kind-specific content of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryBody {
    /// State transition
    Operation(OperationPayload),
    /// Permanent exclusion of a prior operation
    Revocation(RevocationPayload),
    /// Cached resolution result
    Snapshot(SnapshotPayload),
}

impl EntryBody {
    /// Kind tag of this body.
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryBody::Operation(_) => EntryKind::Operation,
            EntryBody::Revocation(_) => EntryKind::Revocation,
            EntryBody::Snapshot(_) => EntryKind::Snapshot,
        }
    }
}

/// An entry that has not been appended yet.
///
/// The store assigns `prev_hash` and seals the draft into a
/// [`LedgerEntry`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    /// Owning session
    pub session_id: SessionId,
    /// Requested timestamp (the store may move it forward)
    pub timestamp: Timestamp,
    /// Content
    pub body: EntryBody,
}

impl EntryDraft {
    /// Create a draft.
    pub fn new(session_id: SessionId, timestamp: Timestamp, body: EntryBody) -> Self {
        EntryDraft {
            session_id,
            timestamp,
            body,
        }
    }

    /// Link the draft to its predecessor and compute its content hash.
    pub fn seal(self, prev_hash: String) -> Result<LedgerEntry> {
        let content_hash = content_hash(&self.session_id, &self.timestamp, &self.body, &prev_hash)?;
        Ok(LedgerEntry {
            session_id: self.session_id,
            timestamp: self.timestamp,
            body: self.body,
            prev_hash,
            content_hash,
        })
    }
}

/// An immutable, persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Owning session
    pub session_id: SessionId,
    /// Append time
    pub timestamp: Timestamp,
    /// Kind tag and payload
    #[serde(flatten)]
    pub body: EntryBody,
    /// Content hash of the previous entry in the session
    pub prev_hash: String,
    /// Hash of all other fields
    pub content_hash: String,
}

impl LedgerEntry {
    /// Kind tag.
    pub fn kind(&self) -> EntryKind {
        self.body.kind()
    }

    /// Operation payload, if this is an OPERATION entry.
    pub fn as_operation(&self) -> Option<&OperationPayload> {
        match &self.body {
            EntryBody::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Revocation payload, if this is a REVOCATION entry.
    pub fn as_revocation(&self) -> Option<&RevocationPayload> {
        match &self.body {
            EntryBody::Revocation(rev) => Some(rev),
            _ => None,
        }
    }

    /// Snapshot payload, if this is a SNAPSHOT entry.
    pub fn as_snapshot(&self) -> Option<&SnapshotPayload> {
        match &self.body {
            EntryBody::Snapshot(snap) => Some(snap),
            _ => None,
        }
    }

    /// Recompute the content hash from the stored fields.
    pub fn recompute_hash(&self) -> Result<String> {
        content_hash(&self.session_id, &self.timestamp, &self.body, &self.prev_hash)
    }

    /// Check that the stored content hash matches the fields.
    pub fn verify_hash(&self) -> Result<()> {
        let computed = self.recompute_hash()?;
        if computed != self.content_hash {
            return Err(CorruptionError::HashMismatch {
                stored: self.content_hash.clone(),
                computed,
            }
            .into());
        }
        Ok(())
    }
}
