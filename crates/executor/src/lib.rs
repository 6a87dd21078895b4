//! Command layer for the lineage ledger
//!
//! Statement text is parsed into a [`Command`], executed by the
//! [`Executor`] against a [`lineage_engine::Ledger`] and answered with an
//! [`Output`].
//!
//! ```ignore
//! let executor = Executor::new(Arc::new(ledger));
//! let executed = executor.run("SHOW ACTIVE OPERATIONS FOR session-1")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod executor;
pub mod handlers;
pub mod parse;

pub use command::{Command, Output, DEFAULT_REVOCATION_REASON};
pub use executor::{Executed, Executor};
pub use parse::{parse, tokenize, Token};

#[cfg(test)]
mod tests;
