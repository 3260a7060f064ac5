//! Errors surfaced by the history log.

use std::path::PathBuf;

use thiserror::Error;

/// History log failures.
///
/// `InsufficientData` is an expected state (a new learner), not a failure;
/// callers branch on it with [`HistoryError::is_insufficient_data`].
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Reading or writing the log failed
    #[error("history I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log exists but is not a valid record list
    #[error("history file {} is corrupt: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Fewer records than the statistics window
    #[error("not enough history: {found} of {required} records")]
    InsufficientData { found: usize, required: usize },
}

impl HistoryError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
