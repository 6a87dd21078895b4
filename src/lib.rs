//! # Lineage Ledger
//!
//! Tamper-evident, append-only ledger of state transitions for independent
//! sessions. Every entry is content-hashed and chained to its session
//! predecessor; the current lineage of a session is always derived from the
//! log, never stored as mutable state.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use lineage_ledger::prelude::*;
//!
//! let config = LedgerConfig::new("./ledger.jsonl")
//!     .session("session-1", SessionProfile::new(3, vec![0]));
//! let ledger = Ledger::open(config)?;
//!
//! let entry = ledger.append_operation(
//!     &SessionId::from("session-1"),
//!     "B2 B1 B2".parse()?,
//!     Lineage::new(["E1", "E2", "E3"], vec![0]),
//!     Lineage::new(["E3", "E2", "E1"], vec![1]),
//!     None,
//! )?;
//! ledger.revoke(&SessionId::from("session-1"), &entry.content_hash, "sovereign_recoil")?;
//!
//! // Or through the statement language
//! let executor = Executor::new(Arc::new(ledger));
//! let executed = executor.run("AUDIT SESSION session-1")?;
//! ```
//!
//! ## Layers
//!
//! - [`model`] - entries, lineages, words, hashing, errors
//! - [`storage`] - the append-only JSON Lines store
//! - [`engine`] - validation, resolution, snapshots, queries, integrity
//! - [`executor`] - statement parsing and command dispatch

#![warn(missing_docs)]

pub mod prelude;

pub use lineage_core as model;
pub use lineage_engine as engine;
pub use lineage_executor as executor;
pub use lineage_storage as storage;

pub use lineage_core::{Error, Result};
pub use lineage_engine::{Ledger, LedgerConfig};
pub use lineage_executor::Executor;
