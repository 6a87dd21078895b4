//! Ledger engine
//!
//! Everything above raw storage:
//! - [`Ledger`]: the facade that pairs the store with resolution
//! - [`resolver`]: lineage resolution with revocations
//! - [`validator`]: operation shape checks
//! - [`snapshot`]: snapshot capture and point-in-time lookups
//! - [`query`]: active set, history, timeline, audit
//! - [`integrity`]: content hash and chain verification
//! - [`config`]: TOML configuration and session profiles

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod integrity;
pub mod ledger;
pub mod query;
pub mod resolver;
pub mod snapshot;
pub mod validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AccessMode, AttestationShape, LedgerConfig, SessionProfile, ValueRange};
pub use integrity::IntegrityReport;
pub use ledger::{Ledger, RevokeOutcome};
pub use query::{AuditReport, RevokedOperation, TimelinePoint};
pub use snapshot::SnapshotRecord;
