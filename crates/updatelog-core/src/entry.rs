//! Update-Log Entry - the Fixed-Width Mutation Record
//!
//! This module defines `UpdateLogEntry`, the unit of data in a segment
//! update log. One entry records one mutation event observed for a segment,
//! e.g. "the row at offset 42 was marked deleted".
//!
//! ## Structure
//! Each entry contains:
//! - **offset**: the row offset inside the segment the event applies to
//! - **value**: the virtual-column value recorded for that row
//! - **event_type**: insert or delete
//! - **partition**: the upstream feed partition the event was consumed from
//!
//! ## On-Disk Format
//!
//! Entries are stored as flat fixed-width records, little-endian, with no
//! header, length prefix, or checksum:
//!
//! ```text
//! ┌──────────┬──────────┬────────────┬───────────┐
//! │ Offset   │ Value    │ Event Type │ Partition │
//! │ (8 bytes)│ (8 bytes)│ (4 bytes)  │ (4 bytes) │
//! └──────────┴──────────┴────────────┴───────────┘
//! ```
//!
//! Every record occupies exactly [`UpdateLogEntry::SIZE`] bytes. A log file
//! is therefore valid only when its length is a multiple of `SIZE`, which is
//! what makes crash recovery a single truncation (see the storage crate).
//!
//! ## Design Decisions
//! - Fixed width means record boundaries are pure arithmetic: record `i`
//!   lives at byte `i * SIZE`. No scanning, no resynchronization.
//! - Entries are immutable values; they are constructed once when the
//!   mutation is observed and never modified afterwards.
//! - `Serialize`/`Deserialize` are derived for metadata and debug tooling;
//!   the on-disk format is the hand-rolled layout above, not serde.
//!
//! ## Example
//! ```ignore
//! let entry = UpdateLogEntry::new(42, 100, UpdateEventType::Delete, 3);
//!
//! let mut buf = BytesMut::with_capacity(UpdateLogEntry::SIZE);
//! entry.encode(&mut buf);
//!
//! let decoded = UpdateLogEntry::decode(&mut buf.freeze())?;
//! assert_eq!(decoded, entry);
//! ```

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of mutation an update-log entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateEventType {
    /// Row inserted or upserted
    Insert,

    /// Row marked deleted
    Delete,
}

impl UpdateEventType {
    fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(UpdateEventType::Insert),
            1 => Ok(UpdateEventType::Delete),
            other => Err(Error::InvalidEventType(other)),
        }
    }

    fn as_raw(self) -> i32 {
        match self {
            UpdateEventType::Insert => 0,
            UpdateEventType::Delete => 1,
        }
    }
}

/// A single mutation event in a segment update log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLogEntry {
    /// Row offset inside the segment
    pub offset: i64,

    /// Virtual-column value recorded for the row
    pub value: i64,

    /// Kind of mutation
    pub event_type: UpdateEventType,

    /// Upstream feed partition the event came from
    pub partition: i32,
}

impl UpdateLogEntry {
    /// Exact width of one encoded entry in bytes.
    ///
    /// Constant for the lifetime of a log file: the file length must be a
    /// multiple of this after recovery.
    pub const SIZE: usize = 8 + 8 + 4 + 4;

    pub fn new(offset: i64, value: i64, event_type: UpdateEventType, partition: i32) -> Self {
        Self {
            offset,
            value,
            event_type,
            partition,
        }
    }

    /// Encode this entry into `buf` at its current write position.
    ///
    /// Writes exactly [`Self::SIZE`] bytes and advances the position by the
    /// same amount.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_i64_le(self.offset);
        buf.put_i64_le(self.value);
        buf.put_i32_le(self.event_type.as_raw());
        buf.put_i32_le(self.partition);
    }

    /// Decode one entry from `buf` at its current read position.
    ///
    /// Consumes exactly [`Self::SIZE`] bytes on success. Fails with
    /// [`Error::CorruptRecord`] when fewer than `SIZE` bytes remain, without
    /// consuming anything.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < Self::SIZE {
            return Err(Error::CorruptRecord {
                remaining: buf.remaining(),
                needed: Self::SIZE,
            });
        }

        let offset = buf.get_i64_le();
        let value = buf.get_i64_le();
        let event_type = UpdateEventType::from_raw(buf.get_i32_le())?;
        let partition = buf.get_i32_le();

        Ok(Self {
            offset,
            value,
            event_type,
            partition,
        })
    }
}
