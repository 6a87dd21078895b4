//! Durability mode for ledger appends.
//!
//! Defines when an appended record is forced to stable storage.

use serde::{Deserialize, Serialize};

/// Durability mode for appends.
///
/// | Mode | fsync | Use case |
/// |------|-------|----------|
/// | Strict | after every append | Production, audit trails |
/// | Relaxed | never (OS buffered) | Tests, scratch ledgers |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    /// `sync_data` after every append. An append returns only once the
    /// record is on stable storage.
    #[default]
    Strict,

    /// Flush to the OS only. A crash may lose recent appends; the torn-tail
    /// recovery on open still guarantees a valid prefix.
    Relaxed,
}

impl DurabilityMode {
    /// Check if this mode requires fsync on every append.
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Strict)
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::Strict => "fsync after every append",
            DurabilityMode::Relaxed => "OS-buffered writes",
        }
    }
}
