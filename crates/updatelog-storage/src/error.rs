//! Storage Error Types
//!
//! This module defines all error types that can occur during update-log
//! storage operations.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - `Io`: open/read/write/sync/delete failure at the OS boundary, propagated
//!   to the caller unchanged
//!
//! ### Contract Errors
//! - `Precondition`: the backing file does not exist when construction
//!   requires it to, a second live log was requested for a path that already
//!   has one, or a remote fetch claimed success without producing the file
//! - `Destroyed`: an operation was attempted on a log after `destroy()`
//!
//! ### Record Errors
//! - `Record`: a record failed to decode (see `updatelog-core`)
//!
//! ### Feature Errors
//! - `Unsupported`: remote download of an update log is not implemented
//!
//! ## Usage
//!
//! All storage operations return `Result<T>` which is aliased to
//! `Result<T, Error>`. This allows clean error propagation with `?`.
//!
//! The component performs no internal retries: every failure here is final
//! from the log's point of view, and callers are expected to treat it as
//! fatal to loading the segment.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record error: {0}")]
    Record(#[from] updatelog_core::Error),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Update log destroyed: {path:?}")]
    Destroyed { path: PathBuf },
}
