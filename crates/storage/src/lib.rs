//! Storage layer for the lineage ledger
//!
//! This crate owns the one durable artifact, an append-only JSON Lines file:
//! - [`LedgerStore`]: open/recover, single-writer append, session scans
//! - [`EntryIter`]: lazy, torn-tail aware decoding
//! - [`DurabilityMode`]: when appends reach stable storage

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod durability;
pub mod reader;
pub mod store;

pub use durability::DurabilityMode;
pub use reader::{EntryIter, TornTail};
pub use store::{LedgerStore, RecoveryReport, StoreOptions, WriteGuard};
