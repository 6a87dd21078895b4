//! Content and chain hashing
//!
//! The content hash of an entry is the lowercase hex SHA-256 of the
//! canonical JSON serialization of every other field of the entry,
//! including `prev_hash`. Because `prev_hash` is itself the predecessor's
//! content hash, the content hashes of one session form a chain: changing,
//! removing or reordering any entry breaks every link after it.
//!
//! Canonical JSON here means serde_json output of the entry types, whose
//! field order is fixed by their declarations. The only map-typed values
//! (attestation summaries) are `BTreeMap`s, so key order is fixed as well.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::entry::EntryBody;
use crate::error::Result;
use crate::timestamp::Timestamp;
use crate::types::SessionId;

/// `prev_hash` of the first entry of every session.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[derive(Serialize)]
struct CanonicalEntry<'a> {
    session_id: &'a SessionId,
    timestamp: &'a Timestamp,
    #[serde(flatten)]
    body: &'a EntryBody,
    prev_hash: &'a str,
}

/// Compute the content hash of an entry from its fields.
pub fn content_hash(
    session_id: &SessionId,
    timestamp: &Timestamp,
    body: &EntryBody,
    prev_hash: &str,
) -> Result<String> {
    let canonical = serde_json::to_vec(&CanonicalEntry {
        session_id,
        timestamp,
        body,
        prev_hash,
    })?;
    Ok(sha256_hex(&canonical))
}
