//! Persisted per-sentence assessment history.
//!
//! The log is a JSON array of [`HistoryRecord`]s in insertion order. Each
//! distinct sentence (trimmed, case-insensitive) has exactly one record,
//! replaced in place when the sentence is assessed again.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use unicode_segmentation::UnicodeSegmentation;

use super::error::HistoryError;
use super::lock::{path_lock, WriteGuard};
use crate::types::{sentence_key, HistoryRecord, WordError, WrongWord};

/// Read every record from `path`. A missing or blank file is an empty
/// history; anything else that fails to parse is an error.
pub fn load_records(path: &Path) -> Result<Vec<HistoryRecord>, HistoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(path).map_err(|e| HistoryError::io(path, e))?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Option<Vec<HistoryRecord>> =
        serde_json::from_str(&data).map_err(|source| HistoryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(records.unwrap_or_default())
}

/// Write the whole collection, replacing the file atomically.
pub fn save_records(path: &Path, records: &[HistoryRecord]) -> Result<(), HistoryError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| HistoryError::io(&dir, e))?;

    let json = serde_json::to_string_pretty(records).map_err(|e| HistoryError::io(path, e.into()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| HistoryError::io(&dir, e))?;
    writeln!(tmp, "{}", json).map_err(|e| HistoryError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| HistoryError::io(path, e.error))?;

    log::debug!("Saved {} history records to {}", records.len(), path.display());
    Ok(())
}

/// Atomic sound tokens named by a word's diff tokens.
///
/// Replacements contribute the expected side, deletions the missing sound
/// and insertions the extra sound. Tokens are grapheme clusters, so a base
/// symbol keeps its diacritics. Whitespace is dropped and duplicates keep
/// their first position.
pub fn sound_tokens(differences: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for diff in differences {
        let quoted = if diff.contains('→') {
            diff.split_once(" → ")
                .map(|(expected, _)| expected.trim_matches('\''))
        } else if diff.contains("missing") || diff.contains("extra") {
            diff.split('\'').nth(1)
        } else {
            None
        };

        let Some(quoted) = quoted else { continue };
        for g in quoted.graphemes(true) {
            if g.trim().is_empty() {
                continue;
            }
            if seen.insert(g.to_string()) {
                tokens.push(g.to_string());
            }
        }
    }
    tokens
}

/// Build the record for one assessment.
///
/// Missing words fail the attempt but contribute no sounds; mispronounced
/// words without any extractable sound are left out.
pub fn build_record(reference: &str, errors: &[WordError]) -> HistoryRecord {
    let wrong_words = errors
        .iter()
        .filter(|e| !e.is_missing())
        .filter_map(|e| {
            let wrong_ipa = sound_tokens(&e.ipa_differences);
            if wrong_ipa.is_empty() {
                None
            } else {
                Some(WrongWord {
                    word: e.word.clone(),
                    wrong_ipa,
                })
            }
        })
        .collect();

    HistoryRecord {
        sentence: reference.trim().to_string(),
        result: errors.is_empty(),
        wrong_words,
    }
}

/// Replace the record for the same sentence, or append. Returns true when
/// an existing record was replaced.
pub fn upsert(records: &mut Vec<HistoryRecord>, record: HistoryRecord) -> bool {
    let key = record.key();
    match records.iter().position(|r| sentence_key(&r.sentence) == key) {
        Some(i) => {
            records[i] = record;
            true
        }
        None => {
            records.push(record);
            false
        }
    }
}

/// Keep only the last `window` records. Returns how many were dropped.
pub fn truncate_records(records: &mut Vec<HistoryRecord>, window: usize) -> usize {
    if records.len() <= window {
        return 0;
    }
    let excess = records.len() - window;
    records.drain(..excess);
    excess
}

/// A history log on disk. Updates are serialized across every store on the
/// same path, and on unix across processes too.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            write_lock: path_lock(&path),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        load_records(&self.path)
    }

    /// Upsert the outcome of assessing `reference` and persist the whole
    /// log. Returns the stored record.
    pub fn record(
        &self,
        reference: &str,
        transcript: &str,
        errors: &[WordError],
    ) -> Result<HistoryRecord, HistoryError> {
        let record = build_record(reference, errors);

        let _guard = WriteGuard::acquire(&self.write_lock, &self.path)?;
        let mut records = self.load()?;
        let replaced = upsert(&mut records, record.clone());
        save_records(&self.path, &records)?;

        log::info!(
            "{} history entry for '{}' (heard '{}')",
            if replaced { "Updated" } else { "Added" },
            record.sentence,
            transcript.trim()
        );
        Ok(record)
    }

    /// Drop all but the last `window` records, rewriting the log only when
    /// something was removed.
    pub fn truncate(&self, window: usize) -> Result<usize, HistoryError> {
        let _guard = WriteGuard::acquire(&self.write_lock, &self.path)?;
        let mut records = self.load()?;
        let dropped = truncate_records(&mut records, window);
        if dropped > 0 {
            save_records(&self.path, &records)?;
            log::info!(
                "Truncated history {} to the last {} records ({} dropped)",
                self.path.display(),
                window,
                dropped
            );
        }
        Ok(dropped)
    }
}
