//! Core types for the lineage ledger
//!
//! This crate defines the data model shared by every layer:
//! - [`LedgerEntry`] and its closed set of payloads ([`EntryBody`])
//! - [`Lineage`], the derived state of a session
//! - [`Word`], the step sequence an operation applies
//! - [`Timestamp`] in canonical, lexicographically sortable form
//! - content/chain hashing ([`hash`])
//! - the error taxonomy ([`Error`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod hash;
pub mod lineage;
pub mod timestamp;
pub mod types;
pub mod word;

pub use entry::{
    Attestation, EntryBody, EntryDraft, EntryKind, LedgerEntry, OperationPayload,
    RevocationPayload, SnapshotPayload,
};
pub use error::{CorruptionError, Error, ParseError, Result, RevocationConflict, ValidationError};
pub use hash::GENESIS_HASH;
pub use lineage::{Lineage, LineageState};
pub use timestamp::Timestamp;
pub use types::SessionId;
pub use word::{Step, Word};
