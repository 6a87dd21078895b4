//! Command dispatch
//!
//! The [`Executor`] resolves a command's session (falling back to its
//! default session), dispatches to the matching handler and returns the
//! handler's [`Output`]. It is the only path from statement text to the
//! ledger.

use std::sync::Arc;

use lineage_core::{ParseError, Result, SessionId};
use lineage_engine::Ledger;
use serde::Serialize;
use tracing::debug;

use crate::command::{Command, Output};
use crate::handlers::{mutation, query};
use crate::parse;

/// Output of a statement together with the session it ran against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Executed {
    /// Session actually used
    pub session: SessionId,
    /// Command result
    pub output: Output,
}

/// Executes [`Command`]s against a [`Ledger`].
#[derive(Clone)]
pub struct Executor {
    ledger: Arc<Ledger>,
    default_session: Option<SessionId>,
}

impl Executor {
    /// Executor whose default session comes from the ledger configuration.
    pub fn new(ledger: Arc<Ledger>) -> Self {
        let default_session = ledger.config().default_session_id();
        Executor {
            ledger,
            default_session,
        }
    }

    /// Override the default session.
    pub fn with_default_session(mut self, session: Option<SessionId>) -> Self {
        self.default_session = session;
        self
    }

    /// Switch the default session.
    pub fn set_default_session(&mut self, session: SessionId) {
        self.default_session = Some(session);
    }

    /// Current default session.
    pub fn default_session(&self) -> Option<&SessionId> {
        self.default_session.as_ref()
    }

    /// The ledger commands run against.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Session a command will run against.
    ///
    /// A command without `FOR` and no default session is rejected as a
    /// missing clause before anything is read or written.
    pub fn resolve_session(&self, command: &Command) -> Result<SessionId> {
        command
            .session()
            .or(self.default_session.as_ref())
            .cloned()
            .ok_or_else(|| {
                ParseError::MissingClause {
                    verb: command.name().to_string(),
                    clause: "FOR",
                }
                .into()
            })
    }

    /// Execute one command.
    pub fn execute(&self, command: Command) -> Result<Output> {
        let session = self.resolve_session(&command)?;
        debug!(command = command.name(), session = %session, "executing");
        let ledger = self.ledger.as_ref();

        match command {
            Command::ActiveOperations { .. } => query::active_operations(ledger, &session),
            Command::RevokedOperations { .. } => query::revoked_operations(ledger, &session),
            Command::OperationHistory { .. } => query::operation_history(ledger, &session),
            Command::FusionTimeline { .. } => query::fusion_timeline(ledger, &session),
            Command::LineageAt { at, .. } => query::lineage_at(ledger, &session, &at),
            Command::Snapshots { .. } => query::snapshots(ledger, &session),
            Command::LastSnapshot { .. } => query::last_snapshot(ledger, &session),
            Command::Audit { .. } => query::audit(ledger, &session),
            Command::Snapshot { note, .. } => mutation::snapshot(ledger, &session, note),
            Command::Revoke { hash, reason, .. } => {
                mutation::revoke(ledger, &session, &hash, reason)
            }
        }
    }

    /// Parse and execute one statement.
    pub fn run(&self, statement: &str) -> Result<Executed> {
        let command = parse::parse(statement)?;
        let session = self.resolve_session(&command)?;
        let output = self.execute(command)?;
        Ok(Executed { session, output })
    }
}
