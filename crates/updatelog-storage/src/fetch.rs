//! Remote Update-Log Fetch Extension Point
//!
//! When an immutable segment is materialized on a server that has no local
//! copy of its update log, the provider asks a [`RemoteLogFetcher`] to
//! download the file from remote storage before opening it.
//!
//! The fetcher is an injectable strategy so that a real implementation (e.g.
//! one backed by the deep-store client) can be substituted without touching
//! the log component. The default, [`NoRemoteFetcher`], fails
//! deterministically: callers must treat "not available locally and not
//! fetchable" as a hard error, never as an empty log.

use std::path::Path;

use crate::error::{Error, Result};

/// Strategy for materializing a missing update-log file from remote storage.
pub trait RemoteLogFetcher: Send + Sync {
    /// Download the update log for `(table, segment)` to `destination`.
    ///
    /// On success the file at `destination` must exist; the provider
    /// re-checks this before opening it.
    fn fetch(&self, table: &str, segment: &str, destination: &Path) -> Result<()>;
}

/// Default fetcher: remote download is not implemented.
///
/// Never creates a file as a side effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemoteFetcher;

impl RemoteLogFetcher for NoRemoteFetcher {
    fn fetch(&self, table: &str, segment: &str, _destination: &Path) -> Result<()> {
        Err(Error::Unsupported(format!(
            "download update log from remote is not supported yet (table {}, segment {})",
            table, segment
        )))
    }
}
