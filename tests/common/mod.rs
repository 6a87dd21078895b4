//! Shared test utilities for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lineage_core::{Lineage, LedgerEntry, SessionId, Step, Word};
use lineage_engine::{AccessMode, Ledger, LedgerConfig, ManualClock, SessionProfile};
use lineage_executor::Executor;
use lineage_storage::DurabilityMode;
use tempfile::TempDir;

/// Session used by most tests.
pub const SESSION: &str = "session-1";

/// Second, non-ASCII session.
pub const OTHER_SESSION: &str = "session-τ-001";

/// Start of the manual clock.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 25, 21, 0, 0).unwrap()
}

pub fn session() -> SessionId {
    SessionId::from(SESSION)
}

pub fn other_session() -> SessionId {
    SessionId::from(OTHER_SESSION)
}

/// Configuration with two three-event sessions and a relaxed store.
pub fn test_config(dir: &TempDir) -> LedgerConfig {
    LedgerConfig::new(dir.path().join("ledger.jsonl"))
        .durability(DurabilityMode::Relaxed)
        .default_session(SESSION)
        .session(SESSION, SessionProfile::new(3, vec![0]))
        .session(OTHER_SESSION, SessionProfile::new(3, vec![0]))
}

/// A ledger in a temporary directory driven by a manual clock.
pub struct TestLedger {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub ledger: Arc<Ledger>,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    pub fn with_config(adjust: impl FnOnce(LedgerConfig) -> LedgerConfig) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = adjust(test_config(&dir));
        let clock = Arc::new(ManualClock::new(epoch()));
        let ledger = Ledger::open(config)
            .expect("Failed to open ledger")
            .with_clock(clock.clone());
        TestLedger {
            dir,
            clock,
            ledger: Arc::new(ledger),
        }
    }

    /// Open a second, read-only handle on the same file.
    pub fn reopen(&self) -> Ledger {
        Ledger::open(self.ledger.config().clone().access_mode(AccessMode::ReadOnly))
            .expect("Failed to reopen ledger")
            .with_clock(self.clock.clone())
    }

    pub fn executor(&self) -> Executor {
        Executor::new(self.ledger.clone())
    }

    pub fn advance(&self, seconds: i64) {
        self.clock.advance(Duration::seconds(seconds));
    }

    pub fn entry_count(&self) -> usize {
        self.ledger.entry_count().expect("Failed to count entries")
    }

    /// Append an operation that swaps the first two events.
    pub fn swap(&self, session: &SessionId, fusion: u8) -> LedgerEntry {
        self.ledger
            .append_operation(
                session,
                Word::new(vec![Step::positive(1)]),
                Lineage::new(["E1", "E2", "E3"], vec![0]),
                Lineage::new(["E2", "E1", "E3"], vec![fusion]),
                None,
            )
            .expect("Failed to append operation")
    }
}

/// `B2 B1 B2` on three events.
pub fn reversal_word() -> Word {
    Word::new(vec![Step::positive(2), Step::positive(1), Step::positive(2)])
}

pub fn e123() -> Lineage {
    Lineage::new(["E1", "E2", "E3"], vec![0])
}

pub fn e321() -> Lineage {
    Lineage::new(["E3", "E2", "E1"], vec![1])
}
