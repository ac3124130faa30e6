//! Update-Log Storage Layer
//!
//! This crate implements durable, crash-recoverable storage for per-segment
//! update logs: the on-disk history of upsert/virtual-column mutation events
//! that a restarted server replays instead of re-consuming the upstream
//! event feed.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐
//! │ Segment loader / writer  │  (caller-owned threads)
//! └───────────┬──────────────┘
//!             │ acquire(table, segment, path)
//!             ▼
//! ┌──────────────────────────┐      missing immutable log
//! │ SegmentUpdateLogProvider │ ─────────────────────────────┐
//! │ - create / reuse / fetch │                              ▼
//! │ - live-path registry     │                   ┌──────────────────┐
//! └───────────┬──────────────┘                   │ RemoteLogFetcher │
//!             │ open + recover                   │ (stub: fails)    │
//!             ▼                                  └──────────────────┘
//! ┌──────────────────────────┐
//! │ SegmentUpdateLog         │
//! │ - read_all / append      │
//! │ - destroy                │
//! └───────────┬──────────────┘
//!             │ fixed-width records, fsync on append
//!             ▼
//! ┌──────────────────────────┐
//! │ one file per segment     │
//! └──────────────────────────┘
//! ```
//!
//! ## Main Components
//!
//! ### SegmentUpdateLog
//! Owns one file and its handle. Appends are written in caller order and
//! forced to stable storage before returning; opening runs a single
//! deterministic recovery truncation that discards a crash-torn trailing
//! record while preserving every complete one.
//!
//! ### SegmentUpdateLogProvider
//! Resolves `(table, segment, storage path)` to a ready log, creating the
//! file for mutable segments and reusing or remote-fetching it for
//! immutable ones. Guarantees at most one live log per path per process.
//!
//! ### RemoteLogFetcher
//! Injectable strategy for downloading a missing immutable-segment log. The
//! default implementation fails deterministically; see [`fetch`].
//!
//! ## Guarantees
//!
//! - **Durability**: `append` returns only after write + fsync
//! - **Recovery**: after `open`, the file length is an exact multiple of the
//!   record size; only a torn tail is ever discarded
//! - **Serialization**: `append`, `read_all`, and `destroy` are mutually
//!   exclusive per log instance
//! - **No retries**: every I/O or decode failure is surfaced to the caller

pub mod config;
pub mod error;
pub mod fetch;
pub mod log;
pub mod provider;

pub use config::UpdateLogConfig;
pub use error::{Error, Result};
pub use fetch::{NoRemoteFetcher, RemoteLogFetcher};
pub use log::SegmentUpdateLog;
pub use provider::SegmentUpdateLogProvider;
