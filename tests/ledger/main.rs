//! Ledger Integration Tests
//!
//! End-to-end behaviour of the engine over a real ledger file: the
//! reference scenarios, the determinism and fail-closed properties,
//! crash recovery and concurrent access.

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod properties;
mod recovery;
