//! Executor Integration Tests
//!
//! Statement text through parsing, session resolution and dispatch to a
//! real ledger file.

#[path = "../common/mod.rs"]
mod common;

mod command_dispatch;
mod statements;
