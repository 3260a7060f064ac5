//! Practice sentence corpus.
//!
//! A tab-separated file (Tatoeba export layout: id, language, sentence)
//! that can be millions of lines long. Lines are addressed by number and
//! read by streaming, so the file is never held in memory. The line count
//! is computed once per corpus and cached.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Column holding the sentence text.
pub const SENTENCE_COLUMN: usize = 2;
/// Exclusive lower bound on sampled sentence length, in characters.
pub const MIN_SENTENCE_CHARS: usize = 10;
/// Exclusive upper bound on sampled sentence length.
pub const MAX_SENTENCE_CHARS: usize = 200;
/// Random line draws before giving up on finding a usable line.
pub const MAX_ATTEMPTS: usize = 50;

/// Used when no corpus file is available.
pub const FALLBACK_SENTENCES: &[&str] = &[
    "The weather is beautiful today.",
    "I would like a cup of coffee, please.",
    "She sells seashells by the seashore.",
    "My mother reads a book every night.",
    "We walk to school in the morning.",
    "They live in a little house by the river.",
    "Please open the kitchen door.",
    "I think the children want to play music.",
];

/// Used when no corpus file is available.
pub const FALLBACK_WORDS: &[&str] = &[
    "weather", "beautiful", "think", "three", "mother", "water", "morning", "world",
];

/// Sentence text of one corpus line, if it has any.
fn sentence_field(line: &str) -> Option<&str> {
    line.trim()
        .split('\t')
        .nth(SENTENCE_COLUMN)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn has_practice_length(sentence: &str) -> bool {
    let n = sentence.chars().count();
    n > MIN_SENTENCE_CHARS && n < MAX_SENTENCE_CHARS
}

/// Practice words from one sentence: punctuation becomes a separator,
/// capitalized words (likely names) and single letters are dropped, the
/// rest lowercased. Sentences containing digits yield nothing.
pub fn extract_words(sentence: &str) -> Vec<String> {
    if sentence.chars().any(|c| c.is_ascii_digit()) {
        return Vec::new();
    }
    let cleaned: String = sentence
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c.is_whitespace() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|w| !w.chars().next().is_some_and(char::is_uppercase))
        .filter(|w| w.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

#[derive(Debug)]
pub struct SentenceCorpus {
    path: PathBuf,
    line_count: OnceLock<usize>,
}

impl SentenceCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            line_count: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn open(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open corpus: {}", self.path.display()))?;
        Ok(BufReader::new(file))
    }

    /// Number of lines, counted on first use.
    pub fn line_count(&self) -> Result<usize> {
        if let Some(&n) = self.line_count.get() {
            return Ok(n);
        }
        log::info!("Counting lines in {}", self.path.display());
        let mut n = 0;
        for line in self.open()?.split(b'\n') {
            line.with_context(|| format!("Failed to read corpus: {}", self.path.display()))?;
            n += 1;
        }
        log::info!("Corpus has {} lines", n);
        Ok(*self.line_count.get_or_init(|| n))
    }

    /// Contents of the given zero-based lines, in ascending line order.
    /// Undecodable lines are read lossily.
    fn read_lines(&self, wanted: &[usize]) -> Result<Vec<(usize, String)>> {
        let mut sorted = wanted.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut out = Vec::with_capacity(sorted.len());
        let mut targets = sorted.into_iter().peekable();
        for (i, line) in self.open()?.split(b'\n').enumerate() {
            let Some(&next) = targets.peek() else { break };
            let line =
                line.with_context(|| format!("Failed to read corpus: {}", self.path.display()))?;
            if i == next {
                out.push((i, String::from_utf8_lossy(&line).into_owned()));
                targets.next();
            }
        }
        Ok(out)
    }

    /// Up to `count` distinct sentences of practice length from randomly
    /// chosen lines. Falls back to built-in sentences without a corpus.
    pub fn sample_sentences(&self, count: usize, rng: &mut StdRng) -> Result<Vec<String>> {
        if !self.is_available() {
            log::warn!(
                "Corpus {} not found, using fallback sentences",
                self.path.display()
            );
            let mut fallback: Vec<String> =
                FALLBACK_SENTENCES.iter().map(|s| s.to_string()).collect();
            fallback.shuffle(rng);
            fallback.truncate(count);
            return Ok(fallback);
        }

        let total = self.line_count()?;
        let amount = (count * 3).min(total);
        let picks = rand::seq::index::sample(rng, total, amount).into_vec();

        let mut seen = HashSet::new();
        let mut sentences = Vec::new();
        for (_, line) in self.read_lines(&picks)? {
            let Some(sentence) = sentence_field(&line) else { continue };
            if has_practice_length(sentence) && seen.insert(sentence.to_string()) {
                sentences.push(sentence.to_string());
                if sentences.len() >= count {
                    break;
                }
            }
        }
        log::debug!("Sampled {} of {} requested sentences", sentences.len(), count);
        Ok(sentences)
    }

    /// Sentence text of one random line that has any.
    fn random_line_sentence(&self, rng: &mut StdRng) -> Result<Option<String>> {
        let total = self.line_count()?;
        if total == 0 {
            return Ok(None);
        }
        let pick = rng.gen_range(0..total);
        Ok(self
            .read_lines(&[pick])?
            .into_iter()
            .next()
            .and_then(|(_, line)| sentence_field(&line).map(str::to_string)))
    }

    /// One random sentence of any length.
    pub fn random_sentence(&self, rng: &mut StdRng) -> Result<String> {
        if self.is_available() {
            for _ in 0..MAX_ATTEMPTS {
                if let Some(sentence) = self.random_line_sentence(rng)? {
                    return Ok(sentence);
                }
            }
            log::warn!("No usable sentence found in {}", self.path.display());
        }
        Ok(FALLBACK_SENTENCES
            .choose(rng)
            .map_or_else(String::new, |s| s.to_string()))
    }

    /// Up to `target` distinct practice words gathered from random lines.
    pub fn collect_words(&self, target: usize, rng: &mut StdRng) -> Result<Vec<String>> {
        if !self.is_available() {
            return Ok(FALLBACK_WORDS
                .iter()
                .take(target)
                .map(|w| w.to_string())
                .collect());
        }

        let mut seen = HashSet::new();
        let mut words = Vec::new();
        for _ in 0..MAX_ATTEMPTS {
            if words.len() >= target {
                break;
            }
            let Some(sentence) = self.random_line_sentence(rng)? else {
                continue;
            };
            for word in extract_words(&sentence) {
                if seen.insert(word.clone()) {
                    words.push(word);
                }
            }
        }
        words.truncate(target);
        Ok(words)
    }

    /// One random practice word.
    pub fn random_word(&self, rng: &mut StdRng) -> Result<String> {
        let words = self.collect_words(10, rng)?;
        let pool: Vec<String> = if words.is_empty() {
            FALLBACK_WORDS.iter().map(|w| w.to_string()).collect()
        } else {
            words
        };
        Ok(pool.choose(rng).cloned().unwrap_or_default())
    }
}
