//! Command handlers, one function per command.
//!
//! Handlers receive a resolved session; defaulting happens in the
//! [`crate::Executor`].

pub mod mutation;
pub mod query;
