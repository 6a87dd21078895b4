//! Convenient imports for the lineage ledger.
//!
//! ```ignore
//! use lineage_ledger::prelude::*;
//! ```

// Entry points
pub use lineage_engine::{Ledger, LedgerConfig, SessionProfile};
pub use lineage_executor::{Command, Executed, Executor, Output};

// Error handling
pub use lineage_core::{Error, Result};

// Data model
pub use lineage_core::{
    Attestation, EntryKind, LedgerEntry, Lineage, LineageState, SessionId, Step, Timestamp, Word,
};

// Outcomes
pub use lineage_engine::{AuditReport, IntegrityReport, RevokeOutcome};
