//! Human-readable assessment report.

use std::collections::HashSet;

use crate::language::normalize::normalize_token;
use crate::types::WordError;

/// Printed in place of the error list when nothing went wrong.
pub const SUCCESS_MARKER: &str = "✓ Pronunciation correct!";
/// Heads the error list.
pub const ERRORS_HEADER: &str = "✗ Pronunciation errors detected:";

/// Wrap every word of `reference` whose normalized form is an error word
/// in `**...**`. Original spacing collapses to single spaces and original
/// punctuation is kept.
pub fn mark_sentence(reference: &str, errors: &[WordError]) -> String {
    let error_words: HashSet<String> = errors.iter().map(|e| e.word.to_lowercase()).collect();

    reference
        .split_whitespace()
        .map(|token| {
            if error_words.contains(&normalize_token(token)) {
                format!("**{}**", token)
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full report: the marked sentence, a blank line, then either the success
/// marker or one block per error.
pub fn render_report(reference: &str, errors: &[WordError]) -> String {
    let mut lines = vec![mark_sentence(reference, errors), String::new()];

    if errors.is_empty() {
        lines.push(SUCCESS_MARKER.to_string());
        return lines.join("\n");
    }

    lines.push(ERRORS_HEADER.to_string());
    lines.push(String::new());
    for error in errors {
        lines.push(format!("• Word '{}':", error.word));
        lines.push(format!("   Expected IPA: {}", error.expected_ipa));
        lines.push(format!("   Actual IPA:   {}", error.actual_ipa));
        lines.push(format!("   Error type:   {}", error.error_type));
        if !error.ipa_differences.is_empty() {
            lines.push(format!(
                "   IPA differences: {}",
                error.ipa_differences.join(", ")
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorType, MISSING_IPA};

    fn error(word: &str, error_type: ErrorType) -> WordError {
        WordError {
            word: word.to_string(),
            expected_ipa: "wɛðər".to_string(),
            actual_ipa: "wether".to_string(),
            error_type,
            ipa_differences: vec!["'ɛðə' → 'ethe'".to_string()],
        }
    }

    #[test]
    fn test_mark_sentence_keeps_punctuation() {
        let marked = mark_sentence(
            "The Weather is nice.",
            &[error("weather", ErrorType::Mispronounced)],
        );
        assert_eq!(marked, "The **Weather** is nice.");
    }

    #[test]
    fn test_mark_sentence_marks_every_occurrence() {
        let marked = mark_sentence("the cat, the hat", &[error("the", ErrorType::Missing)]);
        assert_eq!(marked, "**the** cat, **the** hat");
    }

    #[test]
    fn test_render_success() {
        let report = render_report("Hello world.", &[]);
        assert_eq!(report, format!("Hello world.\n\n{}", SUCCESS_MARKER));
    }

    #[test]
    fn test_render_error_block() {
        let report = render_report(
            "The weather.",
            &[error("weather", ErrorType::Mispronounced)],
        );
        assert!(report.starts_with("The **weather.**"));
        assert!(report.contains(ERRORS_HEADER));
        assert!(report.contains("• Word 'weather':"));
        assert!(report.contains("Expected IPA: wɛðər"));
        assert!(report.contains("Actual IPA:   wether"));
        assert!(report.contains("Error type:   mispronounced"));
        assert!(report.contains("IPA differences: 'ɛðə' → 'ethe'"));
        assert!(!report.contains(SUCCESS_MARKER));
    }

    #[test]
    fn test_render_missing_word() {
        let missing = WordError {
            word: "world".to_string(),
            expected_ipa: "wərld".to_string(),
            actual_ipa: MISSING_IPA.to_string(),
            error_type: ErrorType::Missing,
            ipa_differences: vec!["missing entire word 'wərld'".to_string()],
        };
        let report = render_report("Hello world", &[missing]);
        assert!(report.contains("Actual IPA:   [missing]"));
        assert!(report.contains("Error type:   missing"));
    }
}
