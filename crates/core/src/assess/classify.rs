//! Turn word alignments into typed pronunciation errors.

use crate::assess::sequence::{OpTag, SequenceMatcher};
use crate::config::Thresholds;
use crate::language::g2p::IpaAdapter;
use crate::types::{AlignedWord, ErrorType, WordError, MISSING_IPA};

/// Error type for a matched word's score, or `None` when it counts as
/// correct. Both cut-offs are strict: a score equal to `correct` passes and
/// a score equal to `severe` is only mispronounced.
pub fn classify_score(score: f64, thresholds: &Thresholds) -> Option<ErrorType> {
    if score >= thresholds.correct {
        None
    } else if score < thresholds.severe {
        Some(ErrorType::SeverelyMispronounced)
    } else {
        Some(ErrorType::Mispronounced)
    }
}

/// Character-level diff of two IPA strings, one token per edit region:
/// `'X' → 'Y'`, `missing 'X'` or `extra 'Y'`.
pub fn ipa_differences(expected: &str, actual: &str) -> Vec<String> {
    let a: Vec<char> = expected.chars().collect();
    let b: Vec<char> = actual.chars().collect();
    let slice = |s: &[char], lo: usize, hi: usize| s[lo..hi].iter().collect::<String>();

    SequenceMatcher::new(&a, &b)
        .opcodes()
        .into_iter()
        .filter_map(|op| match op.tag {
            OpTag::Equal => None,
            OpTag::Replace => Some(format!(
                "'{}' → '{}'",
                slice(&a, op.a_start, op.a_end),
                slice(&b, op.b_start, op.b_end)
            )),
            OpTag::Delete => Some(format!("missing '{}'", slice(&a, op.a_start, op.a_end))),
            OpTag::Insert => Some(format!("extra '{}'", slice(&b, op.b_start, op.b_end))),
        })
        .collect()
}

/// The transcript word an alignment points at. A split match is judged
/// against the first word of its window.
fn spoken_word<'a>(aligned: &AlignedWord, transcript: &'a [String]) -> Option<&'a str> {
    aligned
        .transcript_index
        .and_then(|start| transcript.get(start))
        .map(String::as_str)
}

/// One [`WordError`] per missing or poorly matched reference word, in
/// reference order.
pub fn classify(
    alignment: &[AlignedWord],
    reference: &[String],
    transcript: &[String],
    ipa: &IpaAdapter,
    thresholds: &Thresholds,
) -> Vec<WordError> {
    let mut errors = Vec::new();

    for aligned in alignment {
        let Some(word) = reference.get(aligned.reference_index) else {
            continue;
        };

        let spoken = match spoken_word(aligned, transcript) {
            Some(spoken) => spoken,
            None => {
                let expected_ipa = ipa.to_ipa(word);
                errors.push(WordError {
                    word: word.clone(),
                    ipa_differences: vec![format!("missing entire word '{}'", expected_ipa)],
                    expected_ipa,
                    actual_ipa: MISSING_IPA.to_string(),
                    error_type: ErrorType::Missing,
                });
                continue;
            }
        };

        let Some(error_type) = classify_score(aligned.score, thresholds) else {
            continue;
        };

        let expected_ipa = ipa.to_ipa(word);
        let actual_ipa = ipa.to_ipa(spoken);
        log::debug!(
            "'{}' heard as '{}' ({:.3}): {}",
            word,
            spoken,
            aligned.score,
            error_type
        );
        errors.push(WordError {
            word: word.clone(),
            ipa_differences: ipa_differences(&expected_ipa, &actual_ipa),
            expected_ipa,
            actual_ipa,
            error_type,
        });
    }

    errors
}
