//! Statistics over the assessment history.
//!
//! Two views: a windowed progress report over the most recent attempts
//! ([`analyze`]) and a summary of every stored record ([`summarize`]).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::HistoryError;
use super::store::HistoryStore;
use super::tally::Tally;
use crate::types::HistoryRecord;

/// Windows scoring at or above this skip the trend comparison.
pub const TREND_SCORE_CUTOFF: f64 = 8.5;
/// Example words listed per weak sound.
pub const MAX_EXAMPLE_WORDS: usize = 5;
/// Entries kept in each summary ranking.
pub const SUMMARY_TOP_N: usize = 10;

/// Pass rate of the newer half of the window against the older half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundFrequency {
    pub sound: String,
    pub count: usize,
    /// Distinct words the sound went wrong in, first seen first
    pub example_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// Progress over the last `window_size` attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub window_size: usize,
    pub correct: usize,
    /// Pass rate on a 0-10 scale
    pub score: f64,
    /// Only computed when the score is below [`TREND_SCORE_CUTOFF`]
    pub trend: Option<Trend>,
    /// Sounds from failed attempts, most frequent first
    pub sounds: Vec<SoundFrequency>,
    /// Words from failed attempts, most frequent first
    pub words: Vec<WordFrequency>,
}

fn correct_count(records: &[HistoryRecord]) -> usize {
    records.iter().filter(|r| r.result).count()
}

fn half_trend(window: &[HistoryRecord]) -> Trend {
    let (older, newer) = window.split_at(window.len() / 2);
    // compare pass rates without dividing
    let lhs = correct_count(newer) * older.len();
    let rhs = correct_count(older) * newer.len();
    match lhs.cmp(&rhs) {
        std::cmp::Ordering::Greater => Trend::Improving,
        std::cmp::Ordering::Less => Trend::Declining,
        std::cmp::Ordering::Equal => Trend::Stable,
    }
}

/// Windowed report over `records` (oldest first).
///
/// Fails with [`HistoryError::InsufficientData`] when there are fewer than
/// `window_size` records. A window of zero is treated as one.
pub fn analyze(
    records: &[HistoryRecord],
    window_size: usize,
) -> Result<StatisticsReport, HistoryError> {
    let window_size = window_size.max(1);
    if records.len() < window_size {
        return Err(HistoryError::InsufficientData {
            found: records.len(),
            required: window_size,
        });
    }
    let window = &records[records.len() - window_size..];

    let correct = correct_count(window);
    let score = correct as f64 / window_size as f64 * 10.0;
    let trend = (score < TREND_SCORE_CUTOFF).then(|| half_trend(window));

    let mut sound_tally = Tally::new();
    let mut sound_words: HashMap<String, Vec<String>> = HashMap::new();
    let mut word_tally = Tally::new();

    for record in window.iter().filter(|r| !r.result) {
        for wrong in &record.wrong_words {
            word_tally.add(&wrong.word);
            for sound in &wrong.wrong_ipa {
                sound_tally.add(sound);
                let examples = sound_words.entry(sound.clone()).or_default();
                if examples.len() < MAX_EXAMPLE_WORDS && !examples.contains(&wrong.word) {
                    examples.push(wrong.word.clone());
                }
            }
        }
    }

    let sounds = sound_tally
        .ranked()
        .into_iter()
        .map(|(sound, count)| SoundFrequency {
            example_words: sound_words.remove(&sound).unwrap_or_default(),
            sound,
            count,
        })
        .collect();
    let words = word_tally
        .ranked()
        .into_iter()
        .map(|(word, count)| WordFrequency { word, count })
        .collect();

    Ok(StatisticsReport {
        window_size,
        correct,
        score,
        trend,
        sounds,
        words,
    })
}

/// Load the log behind `store` and analyze its last `window_size` records.
///
/// With `truncate` set, the log is then rewritten to hold only that window.
/// Nothing is rewritten when the data is insufficient.
pub fn analyze_history(
    store: &HistoryStore,
    window_size: usize,
    truncate: bool,
) -> Result<StatisticsReport, HistoryError> {
    let records = store.load()?;
    let report = analyze(&records, window_size)?;
    if truncate {
        store.truncate(report.window_size)?;
    }
    Ok(report)
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pronunciation report ===")?;
        write!(f, "Overall score: {:.1}/10", self.score)?;
        if let Some(trend) = self.trend {
            write!(f, "\nTrend: {}", trend)?;
        }

        if self.sounds.is_empty() {
            return write!(
                f,
                "\n\nCongratulations! No pronunciation errors in the last {} sentences.",
                self.window_size
            );
        }

        write!(f, "\n\n=== Practice advice ===\nYou should practice:")?;
        for s in &self.sounds {
            write!(f, "\nSound {} in: {}", s.sound, s.example_words.join(", "))?;
        }
        Ok(())
    }
}

/// Totals over every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_assessments: usize,
    pub correct_assessments: usize,
    /// Percent, rounded to two decimals
    pub accuracy_rate: f64,
    pub most_common_wrong_words: Vec<WordFrequency>,
    pub most_common_wrong_sounds: Vec<SoundFrequency>,
}

/// Summary of the whole history. An empty history gives all zeros.
pub fn summarize(records: &[HistoryRecord]) -> UserStatistics {
    let total = records.len();
    let correct = correct_count(records);
    let accuracy_rate = if total == 0 {
        0.0
    } else {
        (correct as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
    };

    let mut words = Tally::new();
    let mut sounds = Tally::new();
    for wrong in records.iter().flat_map(|r| &r.wrong_words) {
        if !wrong.word.is_empty() {
            words.add(&wrong.word);
        }
        for sound in &wrong.wrong_ipa {
            sounds.add(sound);
        }
    }

    UserStatistics {
        total_assessments: total,
        correct_assessments: correct,
        accuracy_rate,
        most_common_wrong_words: words
            .ranked()
            .into_iter()
            .take(SUMMARY_TOP_N)
            .map(|(word, count)| WordFrequency { word, count })
            .collect(),
        most_common_wrong_sounds: sounds
            .ranked()
            .into_iter()
            .take(SUMMARY_TOP_N)
            .map(|(sound, count)| SoundFrequency {
                sound,
                count,
                example_words: Vec::new(),
            })
            .collect(),
    }
}

impl fmt::Display for UserStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Pronunciation statistics")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total assessments: {}", self.total_assessments)?;
        writeln!(f, "Correct: {}", self.correct_assessments)?;
        writeln!(f, "Accuracy: {}%", self.accuracy_rate)?;

        if !self.most_common_wrong_words.is_empty() {
            writeln!(f, "\nMost frequently mispronounced words:")?;
            for w in &self.most_common_wrong_words {
                writeln!(f, "   • {}: {} times", w.word, w.count)?;
            }
        }
        if !self.most_common_wrong_sounds.is_empty() {
            writeln!(f, "\nMost frequently wrong sounds:")?;
            for s in &self.most_common_wrong_sounds {
                writeln!(f, "   • /{}/: {} times", s.sound, s.count)?;
            }
        }
        write!(f, "{}", rule)
    }
}
