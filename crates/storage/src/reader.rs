//! Streaming reader over the ledger file.
//!
//! [`EntryIter`] decodes one record per line, lazily, so a caller that
//! only needs a prefix of the log (point-in-time lookups, "first match"
//! searches) can stop early without reading the rest of the file.
//!
//! ## Tail handling
//!
//! A record is acknowledged only after its full line, including the
//! trailing newline, has been written. Therefore:
//!
//! - a last line without a newline is an unacknowledged, torn write
//! - a last line that does not decode is also a torn write
//!
//! Both are reported through [`EntryIter::torn_tail`] and excluded from
//! history. An undecodable line that is *followed* by more data cannot be
//! a torn write and is reported as [`CorruptionError::MalformedRecord`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lineage_core::{CorruptionError, Error, LedgerEntry, Result, SessionId};
use tracing::debug;

/// Location of an excluded, incomplete trailing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TornTail {
    /// Byte offset where the torn record starts
    pub offset: u64,
    /// Number of bytes belonging to it
    pub len: u64,
}

/// Lazy iterator over ledger entries in append order.
pub struct EntryIter {
    reader: BufReader<File>,
    session: Option<SessionId>,
    buf: Vec<u8>,
    line_no: usize,
    offset: u64,
    valid_len: u64,
    torn_tail: Option<TornTail>,
    done: bool,
}

impl EntryIter {
    /// Open `path` for reading, optionally restricted to one session.
    pub fn open(path: &Path, session: Option<SessionId>) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::Storage(format!("cannot open ledger {}: {}", path.display(), e))
        })?;
        Ok(EntryIter {
            reader: BufReader::new(file),
            session,
            buf: Vec::new(),
            line_no: 0,
            offset: 0,
            valid_len: 0,
            torn_tail: None,
            done: false,
        })
    }

    /// Torn trailing record seen so far, if any.
    ///
    /// Only meaningful once the iterator is exhausted.
    pub fn torn_tail(&self) -> Option<TornTail> {
        self.torn_tail
    }

    /// Byte length of the valid prefix read so far.
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }

    fn at_eof(&mut self) -> Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    fn mark_torn(&mut self, start: u64, len: u64) {
        debug!(offset = start, len, "excluding torn trailing record");
        self.torn_tail = Some(TornTail { offset: start, len });
        self.done = true;
    }

    /// Read the next decodable record regardless of session.
    fn next_record(&mut self) -> Result<Option<LedgerEntry>> {
        loop {
            if self.done {
                return Ok(None);
            }
            self.buf.clear();
            let start = self.offset;
            let read = self.reader.read_until(b'\n', &mut self.buf)?;
            if read == 0 {
                self.done = true;
                return Ok(None);
            }
            self.offset += read as u64;
            self.line_no += 1;

            if self.buf.last() != Some(&b'\n') {
                self.mark_torn(start, read as u64);
                return Ok(None);
            }

            let line = &self.buf[..self.buf.len() - 1];
            if line.iter().all(u8::is_ascii_whitespace) {
                self.valid_len = self.offset;
                continue;
            }

            match serde_json::from_slice::<LedgerEntry>(line) {
                Ok(entry) => {
                    self.valid_len = self.offset;
                    return Ok(Some(entry));
                }
                Err(e) => {
                    if self.at_eof()? {
                        self.mark_torn(start, read as u64);
                        return Ok(None);
                    }
                    self.done = true;
                    return Err(CorruptionError::MalformedRecord {
                        line: self.line_no,
                        reason: e.to_string(),
                    }
                    .into());
                }
            }
        }
    }
}

impl Iterator for EntryIter {
    type Item = Result<LedgerEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_record() {
                Ok(Some(entry)) => {
                    if let Some(session) = &self.session {
                        if &entry.session_id != session {
                            continue;
                        }
                    }
                    return Some(Ok(entry));
                }
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
