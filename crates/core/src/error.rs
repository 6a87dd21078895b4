//! Error taxonomy for the lineage ledger.
//!
//! Every layer reports failures through [`Error`]. The specific categories
//! carry their own enums so callers can match on the exact cause:
//!
//! - [`ParseError`]: malformed command text (raised before any append)
//! - [`ValidationError`]: grammar/shape violation of a proposed operation
//! - [`CorruptionError`]: hash mismatch, broken chain or malformed record
//! - [`RevocationConflict`]: revoking an unknown or already-revoked
//!   operation. This one is never raised; it is reported as a no-op outcome.

use serde::Serialize;
use thiserror::Error;

/// All ledger errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed command
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Proposed operation failed grammar/shape checks
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Stored data failed an integrity check
    #[error("corruption: {0}")]
    Corruption(#[from] CorruptionError),

    /// Storage unavailable or failed
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error from the underlying file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Unknown session, or no snapshot available for a point-in-time query
    #[error("not found: {0}")]
    NotFound(String),

    /// Mutation attempted on a read-only ledger
    #[error("ledger is open read-only")]
    ReadOnly,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this error was raised before touching the store.
    ///
    /// Parse and validation errors are fail-closed: nothing was written.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Validation(_) | Error::ReadOnly)
    }

    /// Check if this is an integrity failure.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }

    /// Check if this is a storage (I/O) failure.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Malformed command text.
///
/// Each variant is a distinct failure so that callers (and tests) can tell
/// a missing clause apart from an unknown verb or subject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing to parse
    #[error("empty command")]
    Empty,

    /// A quote was opened but never closed
    #[error("unterminated quote starting at byte {0}")]
    UnterminatedQuote(usize),

    /// First token is not a known verb
    #[error("unknown verb '{0}' (expected SHOW, AUDIT, SNAPSHOT or REVOKE)")]
    UnknownVerb(String),

    /// Verb is known but what follows it is not
    #[error("unknown subject '{subject}' for {verb}")]
    UnknownSubject {
        /// Verb being parsed
        verb: String,
        /// Offending subject text
        subject: String,
    },

    /// A required clause was not supplied
    #[error("{verb} requires the {clause} clause")]
    MissingClause {
        /// Verb (and subject) being parsed
        verb: String,
        /// Name of the missing clause
        clause: &'static str,
    },

    /// Clause keyword present without its value
    #[error("{clause} is missing its argument")]
    MissingArgument {
        /// Clause or verb expecting an argument
        clause: &'static str,
    },

    /// Same clause given twice
    #[error("duplicate {0} clause")]
    DuplicateClause(&'static str),

    /// Token that fits nowhere in the grammar
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    /// AT value is not a recognizable ISO-8601 timestamp
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// Word step text such as `B2^x`
    #[error("invalid word step '{0}'")]
    InvalidStep(String),
}

/// Grammar/shape violation of a proposed operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Exponent outside {+1, -1}
    #[error("step {position}: invalid exponent {exponent} (must be +1 or -1)")]
    InvalidExponent {
        /// Zero-based step index
        position: usize,
        /// Offending exponent
        exponent: i64,
    },

    /// Generator symbol is not of the form `B<i>`
    #[error("step {position}: unknown generator '{generator}'")]
    UnknownGenerator {
        /// Zero-based step index
        position: usize,
        /// Offending symbol
        generator: String,
    },

    /// Generator index outside `1..event_count`
    #[error(
        "step {position}: generator '{generator}' out of range for {event_count} tracked events"
    )]
    GeneratorOutOfRange {
        /// Zero-based step index
        position: usize,
        /// Offending symbol
        generator: String,
        /// Tracked-event count of the session
        event_count: usize,
    },

    /// `before`/`after` fusion paths differ in length
    #[error("fusion path length mismatch: before has {before}, after has {after}")]
    FusionLengthMismatch {
        /// Length of `before.fusion_path`
        before: usize,
        /// Length of `after.fusion_path`
        after: usize,
    },

    /// Empty word whose `after` differs from `before`
    #[error("empty word must leave the lineage unchanged")]
    NonIdentityEmptyWord,

    /// Session requires an attestation but none was supplied
    #[error("operation requires an attestation")]
    MissingAttestation,

    /// Attestation digest is empty
    #[error("attestation digest is empty")]
    EmptyDigest,

    /// Attestation summary lacks a declared key
    #[error("attestation summary is missing required key '{0}'")]
    MissingSummaryKey(String),

    /// Attestation value is NaN or infinite
    #[error("attestation value '{key}' is not finite")]
    NonFiniteSummaryValue {
        /// Summary key
        key: String,
    },

    /// Attestation value outside its declared range
    #[error("attestation value '{key}' = {value} outside [{min}, {max}]")]
    SummaryValueOutOfRange {
        /// Summary key
        key: String,
        /// Supplied value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
}

/// Integrity failure of stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "failure", rename_all = "snake_case")]
pub enum CorruptionError {
    /// Recomputed content hash differs from the stored one
    #[error("content hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch {
        /// Hash stored in the record
        stored: String,
        /// Hash recomputed from the record's fields
        computed: String,
    },

    /// `prev_hash` does not link to the predecessor in the session
    #[error(
        "chain broken in session '{session}' at position {position}: expected prev_hash {expected}, found {found}"
    )]
    ChainBroken {
        /// Session whose chain is broken
        session: String,
        /// Zero-based position within the session
        position: usize,
        /// Predecessor's content hash (or genesis sentinel)
        expected: String,
        /// Stored prev_hash
        found: String,
    },

    /// A complete line that cannot be decoded
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// One-based line number in the ledger file
        line: usize,
        /// Decoder message
        reason: String,
    },
}

/// Why a revocation request changed nothing.
///
/// Never raised as an error: revocation of an unknown or already-revoked
/// operation is a logged no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "conflict", rename_all = "snake_case")]
pub enum RevocationConflict {
    /// No OPERATION entry with this hash exists in the session
    #[error("no operation with hash {hash}")]
    UnknownOperation {
        /// Requested hash
        hash: String,
    },

    /// The operation was already revoked
    #[error("operation {hash} already revoked by {revoked_by}")]
    AlreadyRevoked {
        /// Requested hash
        hash: String,
        /// Content hash of the earlier REVOCATION entry
        revoked_by: String,
    },
}
