//! Error Types for the Update-Log Core
//!
//! This module defines the errors that can occur while encoding or decoding
//! update-log records.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - File system operations performed by callers that route through this
//!   crate's `Result`
//!
//! ### Data Integrity Errors
//! - `CorruptRecord`: a decode was attempted on a byte span shorter than one
//!   full record. After recovery truncation this can only mean a bug or an
//!   external writer touched the file.
//! - `InvalidEventType`: the event-type discriminant read from disk is not
//!   one we know how to interpret.
//!
//! ## Usage
//! All fallible functions return `Result<T>`, aliased to `Result<T, Error>`,
//! so callers can propagate with `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record: {remaining} bytes remaining, {needed} needed")]
    CorruptRecord { remaining: usize, needed: usize },

    #[error("Invalid event type: {0}")]
    InvalidEventType(i32),
}

pub type Result<T> = std::result::Result<T, Error>;
