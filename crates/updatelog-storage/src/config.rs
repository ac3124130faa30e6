//! Update-Log Storage Configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for where segment update logs live on local disk.
///
/// The log itself is path-agnostic; this struct carries the conventional
/// one-file-per-`(table, segment)` layout for callers that do not want to
/// build paths by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLogConfig {
    /// Directory holding the per-segment update-log files
    pub directory: PathBuf,
}

impl Default for UpdateLogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./data/updatelog"),
        }
    }
}

impl UpdateLogConfig {
    /// Conventional file path for a segment's update log:
    /// `{directory}/{table}-{segment}.updlog`
    pub fn log_path(&self, table: &str, segment: &str) -> PathBuf {
        self.directory.join(format!("{}-{}.updlog", table, segment))
    }
}
