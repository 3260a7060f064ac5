use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder IPA for a reference word with no transcript counterpart.
pub const MISSING_IPA: &str = "[missing]";

/// How badly a reference word was realised in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Missing,
    Mispronounced,
    SeverelyMispronounced,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Mispronounced => "mispronounced",
            Self::SeverelyMispronounced => "severely_mispronounced",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mispronounced or missing reference word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordError {
    /// Normalized reference word
    pub word: String,
    pub expected_ipa: String,
    /// IPA of the transcript word, or [`MISSING_IPA`]
    pub actual_ipa: String,
    pub error_type: ErrorType,
    /// Human-readable diff regions, e.g. `'ð' → 't'`
    pub ipa_differences: Vec<String>,
}

impl WordError {
    pub fn is_missing(&self) -> bool {
        self.error_type == ErrorType::Missing
    }
}

/// Alignment of one reference word against the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedWord {
    pub reference_index: usize,
    /// First transcript word of the match, `None` when missing
    pub transcript_index: Option<usize>,
    /// Number of consecutive transcript words consumed (0 when missing)
    pub span: usize,
    /// Similarity in [0, 1] (0 when missing)
    pub score: f64,
}

impl AlignedWord {
    pub fn missing(reference_index: usize) -> Self {
        Self {
            reference_index,
            transcript_index: None,
            span: 0,
            score: 0.0,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.transcript_index.is_none()
    }
}

/// A word the learner got wrong, with the sounds involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrongWord {
    pub word: String,
    #[serde(default)]
    pub wrong_ipa: Vec<String>,
}

/// Latest assessment outcome for one reference sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Reference text as presented (trimmed, original casing)
    pub sentence: String,
    /// True when the attempt produced no errors
    pub result: bool,
    #[serde(default)]
    pub wrong_words: Vec<WrongWord>,
}

impl HistoryRecord {
    /// Key used to match re-assessments of the same sentence.
    pub fn key(&self) -> String {
        sentence_key(&self.sentence)
    }
}

/// Case-insensitive, trimmed sentence key.
pub fn sentence_key(sentence: &str) -> String {
    sentence.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_serde_names() {
        let json = serde_json::to_string(&ErrorType::SeverelyMispronounced).unwrap();
        assert_eq!(json, "\"severely_mispronounced\"");
        let back: ErrorType = serde_json::from_str("\"missing\"").unwrap();
        assert_eq!(back, ErrorType::Missing);
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Mispronounced.to_string(), "mispronounced");
    }

    #[test]
    fn test_aligned_word_missing() {
        let a = AlignedWord::missing(3);
        assert!(a.is_missing());
        assert_eq!(a.reference_index, 3);
        assert_eq!(a.span, 0);
    }

    #[test]
    fn test_history_record_defaults_wrong_words() {
        let rec: HistoryRecord =
            serde_json::from_str(r#"{"sentence": "Hi there", "result": true}"#).unwrap();
        assert!(rec.wrong_words.is_empty());
        assert_eq!(rec.key(), "hi there");
    }

    #[test]
    fn test_sentence_key_trims_and_lowercases() {
        assert_eq!(sentence_key("  Hello World \n"), "hello world");
    }
}
