//! Update-Log Provider - Acquiring Logs per Segment
//!
//! This module implements `SegmentUpdateLogProvider`, the factory layer that
//! resolves a `(table, segment, storage path)` triple to a ready-to-use
//! [`SegmentUpdateLog`]. The two acquisition modes differ only in how the
//! backing file is sourced, not in log semantics:
//!
//! - **Mutable (consuming) segment**: the log is always local. An empty file
//!   is created on first acquisition; a file left by a prior run is reused.
//!   Never fetches from remote storage.
//! - **Immutable segment**: an existing local file is reused; otherwise the
//!   injected [`RemoteLogFetcher`] must materialize it first. With the
//!   default fetcher that path fails with `Unsupported` and no file is
//!   created.
//!
//! ## Live-Path Registry
//!
//! Exactly one live `SegmentUpdateLog` may own the file handle for a given
//! path at a time. Rather than leaving that as a convention, the provider
//! tracks live paths in a registry: acquiring a path that already has a live
//! log fails with `Precondition`, and the slot is freed when the log is
//! destroyed or dropped.
//!
//! The provider is constructed once per process and passed by reference to
//! collaborators; it holds no global state.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::error::{Error, Result};
use crate::fetch::{NoRemoteFetcher, RemoteLogFetcher};
use crate::log::SegmentUpdateLog;

/// Factory for per-segment update logs.
pub struct SegmentUpdateLogProvider {
    /// Extension point for materializing missing immutable-segment logs
    fetcher: Arc<dyn RemoteLogFetcher>,

    /// Paths with a live log instance in this process
    live_paths: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Default for SegmentUpdateLogProvider {
    fn default() -> Self {
        Self::new(Arc::new(NoRemoteFetcher))
    }
}

impl SegmentUpdateLogProvider {
    pub fn new(fetcher: Arc<dyn RemoteLogFetcher>) -> Self {
        Self {
            fetcher,
            live_paths: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Acquire the update log for a mutable (consuming) segment.
    ///
    /// Creates an empty file at `storage_path` if none exists, then opens
    /// it. Never fetches from remote storage: a consuming segment's log is
    /// always local, freshly created or left over from a prior run.
    pub fn acquire_for_mutable_segment(
        &self,
        table: &str,
        segment: &str,
        storage_path: impl AsRef<Path>,
    ) -> Result<SegmentUpdateLog> {
        let path = storage_path.as_ref();

        if !path.exists() {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => {
                    info!(
                        table = table,
                        segment = segment,
                        path = ?path,
                        "created empty update log file"
                    );
                }
                // Lost a creation race: the file is there, which is all we need
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.open_live(table, segment, path)
    }

    /// Acquire the update log for an immutable segment.
    ///
    /// Reuses a local file when present; otherwise the remote fetcher must
    /// materialize it before the log is opened. A fetcher that reports
    /// success without producing the file is a contract violation surfaced
    /// as [`Error::Precondition`].
    pub fn acquire_for_immutable_segment(
        &self,
        table: &str,
        segment: &str,
        storage_path: impl AsRef<Path>,
    ) -> Result<SegmentUpdateLog> {
        let path = storage_path.as_ref();

        if !path.exists() {
            self.fetcher.fetch(table, segment, path)?;
            if !path.exists() {
                return Err(Error::Precondition(format!(
                    "remote fetch did not materialize update log at {}",
                    path.display()
                )));
            }
            info!(
                table = table,
                segment = segment,
                path = ?path,
                "downloaded update log from remote"
            );
        }

        self.open_live(table, segment, path)
    }

    fn open_live(&self, table: &str, segment: &str, path: &Path) -> Result<SegmentUpdateLog> {
        let registration = LiveRegistration::register(self.live_paths.clone(), path.to_path_buf())?;
        let log = SegmentUpdateLog::open_registered(path.to_path_buf(), Some(registration))?;

        info!(
            table = table,
            segment = segment,
            path = ?path,
            "acquired update log"
        );

        Ok(log)
    }
}

/// Occupies one path slot in the provider's live-path registry.
///
/// Dropping the registration (log destroyed or dropped) frees the slot.
pub(crate) struct LiveRegistration {
    path: PathBuf,
    registry: Arc<Mutex<HashSet<PathBuf>>>,
}

impl LiveRegistration {
    fn register(registry: Arc<Mutex<HashSet<PathBuf>>>, path: PathBuf) -> Result<Self> {
        if !registry.lock().insert(path.clone()) {
            return Err(Error::Precondition(format!(
                "update log at {} is already open in this process",
                path.display()
            )));
        }
        Ok(Self { path, registry })
    }
}

impl Drop for LiveRegistration {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.path);
    }
}
