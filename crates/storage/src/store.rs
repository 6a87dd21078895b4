//! Append-only ledger store
//!
//! The store is a single JSON Lines file. It is the only durable state of
//! the ledger; everything else (lineages, active sets, timelines) is
//! recomputed from it.
//!
//! ## Design
//!
//! - **Append-only**: records are never rewritten or deleted. The one
//!   exception is the repair of an unacknowledged torn tail on open.
//! - **Atomic append**: each record is written with a single `write_all`
//!   and, in strict mode, synced before the call returns. A failed write
//!   is rolled back by truncating to the previous length, so a record is
//!   fully written or not at all. If the rollback itself fails the writer
//!   is poisoned and refuses further appends until the store is reopened.
//! - **Readable**: a record is decoded back before it is written; a record
//!   the reader could not decode is never acknowledged.
//! - **Chained**: the store assigns `prev_hash` from the session's chain
//!   head; the content hash binds it.
//! - **Single writer**: all appends go through one [`WriteGuard`] at a
//!   time. Check-then-append sequences (revocation, snapshot) hold the
//!   guard across the check so nothing can interleave.
//! - **Concurrent readers**: scans open their own handle and decode only
//!   newline-terminated records, so they always observe a valid prefix.
//!
//! ## Ordering
//!
//! Append order is chronological order: the store never gives a record a
//! timestamp earlier than the last appended one. A requested timestamp
//! that lies in the past is moved forward to the last timestamp, which
//! yields a tie rather than a reordering.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use lineage_core::{EntryDraft, Error, LedgerEntry, Result, SessionId, Timestamp, GENESIS_HASH};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::durability::DurabilityMode;
use crate::reader::{EntryIter, TornTail};

/// Options for opening a store.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// When appended records are synced
    pub durability: DurabilityMode,
    /// Open without a writer; appends fail with [`Error::ReadOnly`]
    pub read_only: bool,
}

impl StoreOptions {
    /// Default options: strict durability, read-write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set durability mode.
    pub fn durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode;
        self
    }

    /// Open read-only.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// What opening the store found on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Valid entries in the file
    pub entries: u64,
    /// Distinct sessions seen
    pub sessions: usize,
    /// Torn trailing record that was excluded (and, for a writer, removed)
    pub torn_tail: Option<TornTail>,
}

struct WriterState {
    file: File,
    len: u64,
    heads: HashMap<SessionId, String>,
    last_timestamp: Option<Timestamp>,
    poisoned: bool,
}

/// Append-only, hash-chained ledger file.
pub struct LedgerStore {
    path: PathBuf,
    durability: DurabilityMode,
    writer: Option<Mutex<WriterState>>,
    recovery: RecoveryReport,
}

impl LedgerStore {
    /// Open (or create) the ledger at `path`.
    ///
    /// Scans the existing file to rebuild chain heads. A torn trailing
    /// record is removed when opening read-write and merely excluded when
    /// opening read-only. An undecodable record anywhere else aborts the
    /// open with a corruption error: the store never appends after a
    /// history it cannot read.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if options.read_only {
            if !path.exists() {
                return Err(Error::Storage(format!(
                    "ledger {} does not exist",
                    path.display()
                )));
            }
            let (_, recovery) = Self::rebuild(&path)?;
            return Ok(LedgerStore {
                path,
                durability: options.durability,
                writer: None,
                recovery,
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::Storage(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::Storage(format!("cannot open {}: {}", path.display(), e)))?;

        let (state, recovery) = Self::rebuild(&path)?;
        if let Some(tail) = recovery.torn_tail {
            warn!(
                path = %path.display(),
                offset = tail.offset,
                bytes = tail.len,
                "removing torn trailing record left by an interrupted append"
            );
            file.set_len(tail.offset)?;
            file.sync_all()?;
        }

        info!(
            path = %path.display(),
            entries = recovery.entries,
            sessions = recovery.sessions,
            "opened ledger"
        );

        let writer = WriterState {
            file,
            len: state.len,
            heads: state.heads,
            last_timestamp: state.last_timestamp,
            poisoned: false,
        };
        Ok(LedgerStore {
            path,
            durability: options.durability,
            writer: Some(Mutex::new(writer)),
            recovery,
        })
    }

    /// Scan the whole file, collecting chain heads and the last timestamp.
    fn rebuild(path: &Path) -> Result<(PartialState, RecoveryReport)> {
        let mut state = PartialState::default();
        if !path.exists() {
            return Ok((state, RecoveryReport::default()));
        }
        let mut iter = EntryIter::open(path, None)?;
        for entry in iter.by_ref() {
            let entry = entry?;
            state.entries += 1;
            if state
                .last_timestamp
                .as_ref()
                .map_or(true, |last| &entry.timestamp > last)
            {
                state.last_timestamp = Some(entry.timestamp.clone());
            }
            state.heads.insert(entry.session_id, entry.content_hash);
        }
        state.len = iter.valid_len();
        let report = RecoveryReport {
            entries: state.entries,
            sessions: state.heads.len(),
            torn_tail: iter.torn_tail(),
        };
        Ok((state, report))
    }

    /// Path of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode in effect.
    pub fn durability(&self) -> DurabilityMode {
        self.durability
    }

    /// Whether appends are allowed.
    pub fn is_read_only(&self) -> bool {
        self.writer.is_none()
    }

    /// What was found when the store was opened.
    pub fn recovery(&self) -> &RecoveryReport {
        &self.recovery
    }

    /// Acquire the single writer.
    ///
    /// Blocks while another append sequence is in progress. Reads are not
    /// blocked and may be issued while holding the guard.
    pub fn writer(&self) -> Result<WriteGuard<'_>> {
        let writer = self.writer.as_ref().ok_or(Error::ReadOnly)?;
        Ok(WriteGuard {
            state: writer.lock(),
            durability: self.durability,
            path: &self.path,
        })
    }

    /// Append one entry.
    pub fn append(&self, draft: EntryDraft) -> Result<LedgerEntry> {
        self.writer()?.append(draft)
    }

    /// Lazy iterator over entries, optionally restricted to one session.
    pub fn iter(&self, session: Option<&SessionId>) -> Result<EntryIter> {
        EntryIter::open(&self.path, session.cloned())
    }

    /// Collect entries in append order, optionally for one session.
    pub fn scan(&self, session: Option<&SessionId>) -> Result<Vec<LedgerEntry>> {
        self.iter(session)?.collect()
    }

    /// Distinct sessions in order of first appearance.
    pub fn sessions(&self) -> Result<Vec<SessionId>> {
        let mut seen = Vec::new();
        for entry in self.iter(None)? {
            let entry = entry?;
            if !seen.contains(&entry.session_id) {
                seen.push(entry.session_id);
            }
        }
        Ok(seen)
    }

    /// Number of valid entries.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for entry in self.iter(None)? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// True if the ledger holds no valid entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[derive(Default)]
struct PartialState {
    len: u64,
    heads: HashMap<SessionId, String>,
    last_timestamp: Option<Timestamp>,
    entries: u64,
}

/// Exclusive append access to the store.
pub struct WriteGuard<'a> {
    state: MutexGuard<'a, WriterState>,
    durability: DurabilityMode,
    path: &'a Path,
}

impl WriteGuard<'_> {
    /// Current chain head of a session (genesis sentinel if none).
    pub fn head(&self, session: &SessionId) -> &str {
        self.state
            .heads
            .get(session)
            .map(String::as_str)
            .unwrap_or(GENESIS_HASH)
    }

    /// Append one entry, sealing it against the session's chain head.
    pub fn append(&mut self, mut draft: EntryDraft) -> Result<LedgerEntry> {
        if self.state.poisoned {
            return Err(Error::Storage(format!(
                "writer for {} is poisoned by a failed rollback; reopen the ledger",
                self.path.display()
            )));
        }
        if let Some(last) = &self.state.last_timestamp {
            if &draft.timestamp < last {
                debug!(
                    requested = %draft.timestamp,
                    assigned = %last,
                    "timestamp moved forward to keep append order chronological"
                );
                draft.timestamp = last.clone();
            }
        }

        let prev_hash = self.head(&draft.session_id).to_string();
        let entry = draft.seal(prev_hash)?;
        let mut line = serde_json::to_vec(&entry)?;
        if let Err(e) = serde_json::from_slice::<LedgerEntry>(&line) {
            return Err(Error::Serialization(format!(
                "entry would not decode after writing: {}",
                e
            )));
        }
        line.push(b'\n');

        if let Err(e) = self.write_record(&line) {
            self.rollback();
            return Err(Error::Storage(format!(
                "append to {} failed: {}",
                self.path.display(),
                e
            )));
        }

        let state = &mut *self.state;
        state.len += line.len() as u64;
        state.last_timestamp = Some(entry.timestamp.clone());
        state
            .heads
            .insert(entry.session_id.clone(), entry.content_hash.clone());

        debug!(
            session = %entry.session_id,
            kind = %entry.kind(),
            hash = %entry.content_hash,
            "appended entry"
        );
        Ok(entry)
    }

    fn write_record(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.state.file.write_all(line)?;
        self.state.file.flush()?;
        if self.durability.requires_immediate_fsync() {
            self.state.file.sync_data()?;
        }
        Ok(())
    }

    fn rollback(&mut self) {
        let len = self.state.len;
        if let Err(e) = self.state.file.set_len(len) {
            self.state.poisoned = true;
            warn!(
                path = %self.path.display(),
                error = %e,
                "could not roll back failed append; refusing appends until reopened"
            );
        }
    }
}
