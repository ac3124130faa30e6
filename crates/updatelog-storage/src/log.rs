//! Segment Update Log - Durable Append-Only Mutation History
//!
//! This module implements `SegmentUpdateLog`, the per-segment on-disk log of
//! upsert/virtual-column mutation events. A restarted server replays the log
//! instead of re-consuming the upstream event feed from the beginning.
//!
//! ## What Does SegmentUpdateLog Do?
//!
//! 1. **Opens** the segment's log file and runs crash recovery
//! 2. **Replays history** via `read_all()` when the segment is loaded
//! 3. **Appends** new mutation events, each batch forced to stable storage
//!    before the call returns
//! 4. **Destroys** the log (close + delete) when the segment is dropped
//!
//! ## File Format
//!
//! A flat sequence of fixed-width records, each exactly
//! [`UpdateLogEntry::SIZE`] bytes, with no header, footer, magic bytes, or
//! checksum:
//!
//! ```text
//! [Entry 1][Entry 2]...[Entry N]
//! ```
//!
//! The file length is a multiple of `SIZE` at every point except while a
//! crash interrupts an in-flight write. That transient state is resolved by
//! recovery at the next open.
//!
//! ## Crash Recovery
//!
//! At open, if the file length is not a multiple of the record size, the
//! process previously died mid-append. The undecodable tail is truncated
//! away and the truncation is forced to disk before the open returns. Only
//! the partial trailing record is lost; every complete record is preserved.
//! The upstream event feed is replayable, so the lost in-flight event will
//! be re-delivered and re-appended. Losing complete historical records
//! would not be recoverable; losing the tail is.
//!
//! ## Concurrency
//!
//! The log is a passive, synchronous library: no background tasks, no
//! channels. Callers own the threads (typically a segment ingestion thread
//! appending and an administrative thread that may destroy). One exclusive
//! mutex guards the file handle; `append`, `read_all`, and `destroy` all
//! take it, so at most one of them runs at a time and records land in the
//! file in the order their calls were serialized. `read_all` is a cold,
//! startup-only path, so sharing the append lock costs nothing.
//!
//! ## Example Usage
//!
//! ```ignore
//! use updatelog_storage::SegmentUpdateLog;
//! use updatelog_core::{UpdateEventType, UpdateLogEntry};
//!
//! let log = SegmentUpdateLog::open("./data/updatelog/orders-seg0.updlog")?;
//!
//! // Replay history once at segment load
//! for entry in log.read_all()? {
//!     virtual_columns.apply(entry);
//! }
//!
//! // Append as new mutation events arrive; durable on return
//! log.append(&[UpdateLogEntry::new(42, 7, UpdateEventType::Delete, 0)])?;
//!
//! // Segment dropped: close handle and delete the file
//! log.destroy()?;
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::{debug, info};
use updatelog_core::UpdateLogEntry;

use crate::error::{Error, Result};
use crate::provider::LiveRegistration;

/// Mutable state behind the log's exclusive lock.
///
/// `file: None` is the terminal `Destroyed` state; there is no way to reach
/// a stale handle once the log has been destroyed.
struct LogState {
    file: Option<File>,
    registration: Option<LiveRegistration>,
}

/// Durable append-only log of mutation events for exactly one segment.
///
/// Exclusively owns the file handle for its path. The provider guarantees no
/// second live instance exists over the same path within the process.
pub struct SegmentUpdateLog {
    /// Absolute path of the backing file (the log's identity)
    path: PathBuf,

    /// File handle and lifecycle state, behind the exclusive mutator lock
    state: Mutex<LogState>,
}

impl SegmentUpdateLog {
    /// Open the update log at `path`, running crash recovery.
    ///
    /// Fails with [`Error::Precondition`] if the file does not exist and
    /// with [`Error::Io`] if it cannot be opened read/write. After a
    /// successful open the file length is a multiple of
    /// [`UpdateLogEntry::SIZE`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_registered(path.into(), None)
    }

    /// Open with a live-path registration from the provider. The
    /// registration is released when the log is destroyed or dropped.
    pub(crate) fn open_registered(
        path: PathBuf,
        registration: Option<LiveRegistration>,
    ) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Precondition(format!(
                "update log file {} does not exist",
                path.display()
            )));
        }

        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let len = Self::recover(&file, &path)?;

        info!(path = ?path, len, "update log opened");

        Ok(Self {
            path,
            state: Mutex::new(LogState {
                file: Some(file),
                registration,
            }),
        })
    }

    /// Discard a partially written trailing record left by a crash.
    ///
    /// Truncates the file down to the largest multiple of the record size
    /// and forces the truncation to disk. Returns the recovered length.
    fn recover(file: &File, path: &Path) -> Result<u64> {
        let record_size = UpdateLogEntry::SIZE as u64;
        let len = file.metadata()?.len();

        if len % record_size == 0 {
            return Ok(len);
        }

        let new_len = len / record_size * record_size;
        file.set_len(new_len)?;
        file.sync_data()?;

        info!(
            path = ?path,
            old_len = len,
            new_len,
            "truncated partially written update log"
        );

        Ok(new_len)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the entire log, oldest entry first.
    ///
    /// Re-reads the file from the beginning on every call; an empty file
    /// yields an empty vec. The file is the sole source of truth; no
    /// in-memory cache of written entries is kept.
    pub fn read_all(&self) -> Result<Vec<UpdateLogEntry>> {
        let mut state = self.state.lock();
        let file = state.file.as_mut().ok_or_else(|| self.destroyed())?;

        let len = file.metadata()?.len() as usize;
        if len == 0 {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(0))?;
        let mut raw = Vec::with_capacity(len);
        file.read_to_end(&mut raw)?;

        // Both append and recovery maintain the size-multiple invariant, so
        // a partial tail here would mean a concurrent writer outside this
        // component's control.
        let count = raw.len() / UpdateLogEntry::SIZE;
        let mut buf = raw.as_slice();
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(UpdateLogEntry::decode(&mut buf)?);
        }

        debug!(path = ?self.path, count, "read update log entries");

        Ok(entries)
    }

    /// Append a batch of entries and force them to stable storage.
    ///
    /// All entries are written in the given order with a single write, then
    /// fsynced; they are visible to `read_all` and durable across restarts
    /// once this returns. On failure no prefix of the batch should be
    /// assumed persisted; the next open's recovery truncation handles a
    /// torn write. Serialized against `append`, `read_all`, and `destroy`.
    pub fn append(&self, entries: &[UpdateLogEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock();
        let file = state.file.as_mut().ok_or_else(|| self.destroyed())?;

        let mut buf = BytesMut::with_capacity(entries.len() * UpdateLogEntry::SIZE);
        for entry in entries {
            entry.encode(&mut buf);
        }

        file.seek(SeekFrom::End(0))?;
        file.write_all(&buf)?;
        file.sync_all()?;

        debug!(path = ?self.path, count = entries.len(), "appended update log entries");

        Ok(())
    }

    /// Close the file handle and delete the backing file.
    ///
    /// Terminal: every subsequent operation on this instance fails with
    /// [`Error::Destroyed`]. A backing file already removed externally is
    /// not an error. Serialized against `append` and `read_all`.
    pub fn destroy(&self) -> Result<()> {
        let mut state = self.state.lock();
        let file = state.file.take().ok_or_else(|| self.destroyed())?;
        drop(file);

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // Release the provider's live-path slot so the path can be acquired
        // again (e.g. the segment is re-created later).
        state.registration.take();

        info!(path = ?self.path, "update log destroyed");

        Ok(())
    }

    fn destroyed(&self) -> Error {
        Error::Destroyed {
            path: self.path.clone(),
        }
    }
}
