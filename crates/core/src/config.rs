//! Assessment configuration: thresholds, file locations, history window.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Pass A: minimum combined score for a confident 1:1 match.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Pass B: minimum text similarity of a word against a joined window.
pub const MERGE_THRESHOLD: f64 = 0.6;
/// Pass C: minimum combined score for a fallback 1:1 match.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.4;
/// Scores at or above this are pronounced correctly.
pub const CORRECT_THRESHOLD: f64 = 0.8;
/// Scores below this are severely mispronounced.
pub const SEVERE_THRESHOLD: f64 = 0.4;
/// Transcript window sizes tried by merge detection, in order.
pub const MERGE_WINDOWS: [usize; 2] = [2, 3];

/// Number of most recent records the statistics look at.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Alignment and classification cut-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high_confidence: f64,
    pub merge: f64,
    pub low_confidence: f64,
    pub correct: f64,
    pub severe: f64,
    pub merge_windows: Vec<usize>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_confidence: HIGH_CONFIDENCE_THRESHOLD,
            merge: MERGE_THRESHOLD,
            low_confidence: LOW_CONFIDENCE_THRESHOLD,
            correct: CORRECT_THRESHOLD,
            severe: SEVERE_THRESHOLD,
            merge_windows: MERGE_WINDOWS.to_vec(),
        }
    }
}

/// Top-level configuration, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    pub thresholds: Thresholds,
    /// History log location; `data_dir()/history.json` when unset
    pub history_path: Option<PathBuf>,
    pub window_size: usize,
    /// Drop records older than the window whenever statistics run
    pub truncate_history: bool,
    /// Full CMU-format pronouncing dictionary; the embedded lexicon when unset
    pub lexicon_path: Option<PathBuf>,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            history_path: None,
            window_size: DEFAULT_WINDOW_SIZE,
            truncate_history: true,
            lexicon_path: None,
        }
    }
}

impl AssessConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: AssessConfig = serde_json::from_str(&data)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Resolved history log path.
    pub fn history_path(&self) -> PathBuf {
        self.history_path
            .clone()
            .unwrap_or_else(|| data_dir().join("history.json"))
    }
}

/// Get the data directory.
///
/// Uses `ELOCUTE_DATA_DIR` env var if set, otherwise `~/.local/share/elocute`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ELOCUTE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".local").join("share").join("elocute")
}
