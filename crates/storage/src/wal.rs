// SPDX-License-Identifier: MIT

//! Generic append-only write-ahead log.
//!
//! Entries are newline-delimited JSON, each tagged with a monotonic sequence
//! number. `open` tolerates a log tail corrupted by a crash mid-write:
//! anything from the first unparsable line onward is rotated out to a
//! `.bak` file and the clean prefix is kept.

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const FLUSH_THRESHOLD_COUNT: u32 = 100;
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);
const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`. The
/// oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| if n == 1 { path.with_extension("bak") } else { path.with_extension(format!("bak.{n}")) };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry<T> {
    pub seq: u64,
    pub event: T,
}

/// A single-writer, many-reader-unsafe append log of `T`. Not `Sync`; callers
/// guard it behind a mutex (see [`crate::state_store::StateStore`]).
pub struct Wal<T> {
    path: PathBuf,
    file: BufWriter<File>,
    entries: Vec<WalEntry<T>>,
    write_seq: u64,
    processed_seq: u64,
    read_cursor: usize,
    pending_since_flush: u32,
    last_flush: Instant,
}

impl<T> Wal<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Open (creating if absent) the WAL at `path`, replaying entries into
    /// memory. `processed_seq` is supplied by the caller (typically restored
    /// from a snapshot) and seeds the read cursor so `next_unprocessed` only
    /// surfaces entries written after the last durable checkpoint.
    pub fn open(path: impl Into<PathBuf>, processed_seq: u64) -> Result<Self, StorageError> {
        let path = path.into();
        let raw = if path.exists() { fs::read(&path)? } else { Vec::new() };
        let (entries, corrupt) = Self::parse_entries(&raw);

        if corrupt {
            let bak = rotate_bak_path(&path);
            if path.exists() {
                fs::rename(&path, &bak)?;
            }
            let mut rewritten = BufWriter::new(File::create(&path)?);
            for entry in &entries {
                Self::write_line(&mut rewritten, entry)?;
            }
            rewritten.flush()?;
            rewritten.get_ref().sync_all()?;
        }

        let write_seq = entries.last().map(|e| e.seq).unwrap_or(0);
        let read_cursor = entries.iter().position(|e| e.seq > processed_seq).unwrap_or(entries.len());

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: BufWriter::new(file),
            entries,
            write_seq,
            processed_seq,
            read_cursor,
            pending_since_flush: 0,
            last_flush: Instant::now(),
        })
    }

    /// Parse `raw` into the longest valid prefix of entries, byte-split on
    /// `\n` so a single corrupt or binary segment doesn't poison lines parsed
    /// before it. Returns whether anything had to be discarded.
    fn parse_entries(raw: &[u8]) -> (Vec<WalEntry<T>>, bool) {
        let mut entries = Vec::new();
        let mut corrupt = false;
        let mut consumed = 0usize;
        for segment in raw.split(|b| *b == b'\n') {
            if segment.is_empty() {
                consumed += 1;
                continue;
            }
            let parsed = std::str::from_utf8(segment).ok().and_then(|line| serde_json::from_str::<WalEntry<T>>(line).ok());
            match parsed {
                Some(entry) => {
                    entries.push(entry);
                    consumed += segment.len() + 1;
                }
                None => {
                    corrupt = true;
                    break;
                }
            }
        }
        let _ = consumed;
        (entries, corrupt)
    }

    fn write_line(writer: &mut impl Write, entry: &WalEntry<T>) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        writer.write_all(&line)?;
        Ok(())
    }

    /// Append `event`, returning its assigned sequence number. Buffered;
    /// call [`Self::flush`] (or rely on [`Self::needs_flush`]) for
    /// durability.
    pub fn append(&mut self, event: &T) -> Result<u64, StorageError> {
        let seq = self.write_seq + 1;
        let entry = WalEntry { seq, event: event.clone() };
        Self::write_line(&mut self.file, &entry)?;
        self.entries.push(entry);
        self.write_seq = seq;
        self.pending_since_flush += 1;
        Ok(seq)
    }

    /// Flush buffered writes to disk and fsync.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        self.pending_since_flush = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    pub fn needs_flush(&self) -> bool {
        self.pending_since_flush >= FLUSH_THRESHOLD_COUNT || self.last_flush.elapsed() >= FLUSH_INTERVAL
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Advance the durable processed watermark. Never moves backward.
    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// Pop the next entry past the in-memory read cursor, or `None` if
    /// caught up. Independent of `processed_seq` bookkeeping.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry<T>>, StorageError> {
        if self.read_cursor < self.entries.len() {
            let entry = self.entries[self.read_cursor].clone();
            self.read_cursor += 1;
            Ok(Some(entry))
        } else {
            Ok(None)
        }
    }

    /// All entries with `seq > after`, in order.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry<T>>, StorageError> {
        Ok(self.entries.iter().filter(|e| e.seq > after).cloned().collect())
    }

    /// Drop entries with `seq < keep_from` from memory and disk, typically
    /// called right after a snapshot makes them redundant.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), StorageError> {
        self.entries.retain(|e| e.seq >= keep_from);
        self.read_cursor = self.entries.iter().position(|e| e.seq > self.processed_seq).unwrap_or(self.entries.len());

        let mut rewritten = BufWriter::new(File::create(&self.path)?);
        for entry in &self.entries {
            Self::write_line(&mut rewritten, entry)?;
        }
        rewritten.flush()?;
        rewritten.get_ref().sync_all()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        self.file = BufWriter::new(file);
        self.pending_since_flush = 0;
        self.last_flush = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
