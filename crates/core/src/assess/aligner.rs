//! Align reference words to a noisy transcript.
//!
//! Greedy multi-pass matching, high confidence first. Each pass consumes
//! transcript positions, so later passes only see what is left:
//!
//! - Pass A: best unused transcript word scoring at least `high_confidence`.
//! - Pass B: a reference word split by the recognizer into a window of
//!   consecutive unused transcript words (spelling similarity only).
//! - Pass C: best unused transcript word scoring at least `low_confidence`.
//!
//! Reference words still unmatched are missing. Several reference words
//! collapsed into one transcript word (e.g. "ice cream" -> "icecream") are
//! not detected.

use std::collections::HashMap;

use crate::assess::similarity::{combine, text_similarity};
use crate::config::Thresholds;
use crate::language::g2p::IpaAdapter;
use crate::types::AlignedWord;

/// Combined similarity for every (reference, transcript) pair.
///
/// Each distinct word is converted to IPA once.
pub fn similarity_matrix(
    reference: &[String],
    transcript: &[String],
    ipa: &IpaAdapter,
) -> Vec<Vec<f64>> {
    let mut cache: HashMap<&str, String> = HashMap::new();
    for w in reference.iter().chain(transcript) {
        cache
            .entry(w.as_str())
            .or_insert_with(|| ipa.to_ipa(w));
    }

    reference
        .iter()
        .map(|r| {
            transcript
                .iter()
                .map(|h| combine(r, h, &cache[r.as_str()], &cache[h.as_str()]))
                .collect()
        })
        .collect()
}

/// Bookkeeping shared by the passes.
struct AlignState {
    result: Vec<AlignedWord>,
    used: Vec<bool>,
}

impl AlignState {
    fn commit(&mut self, reference_index: usize, start: usize, span: usize, score: f64) {
        self.result[reference_index] = AlignedWord {
            reference_index,
            transcript_index: Some(start),
            span,
            score,
        };
        for used in &mut self.used[start..start + span] {
            *used = true;
        }
    }

    fn is_matched(&self, reference_index: usize) -> bool {
        !self.result[reference_index].is_missing()
    }
}

/// One-to-one pass: each unmatched reference word takes its best unused
/// transcript word at or above `threshold`. The first maximal candidate in
/// transcript order wins ties.
fn match_one_to_one(state: &mut AlignState, matrix: &[Vec<f64>], threshold: f64) -> usize {
    let mut committed = 0;
    for (i, row) in matrix.iter().enumerate() {
        if state.is_matched(i) {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for (j, &score) in row.iter().enumerate() {
            if state.used[j] || score < threshold {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((j, score));
            }
        }
        if let Some((j, score)) = best {
            state.commit(i, j, 1, score);
            committed += 1;
        }
    }
    committed
}

/// First window of consecutive unused transcript words whose concatenation
/// spells `word` closely enough. Window sizes are tried in order, positions
/// left to right. Returns `(start, size, score)`.
fn find_split(
    word: &str,
    transcript: &[String],
    used: &[bool],
    windows: &[usize],
    threshold: f64,
) -> Option<(usize, usize, f64)> {
    for &size in windows {
        if size == 0 || size > transcript.len() {
            continue;
        }
        for start in 0..=transcript.len() - size {
            if used[start..start + size].iter().any(|&u| u) {
                continue;
            }
            let joined = transcript[start..start + size].concat();
            let score = text_similarity(word, &joined);
            if score >= threshold {
                return Some((start, size, score));
            }
        }
    }
    None
}

/// Align every reference word, returning one entry per reference index in
/// order.
pub fn align_words(
    reference: &[String],
    transcript: &[String],
    ipa: &IpaAdapter,
    thresholds: &Thresholds,
) -> Vec<AlignedWord> {
    let mut state = AlignState {
        result: (0..reference.len()).map(AlignedWord::missing).collect(),
        used: vec![false; transcript.len()],
    };
    if reference.is_empty() || transcript.is_empty() {
        return state.result;
    }

    let matrix = similarity_matrix(reference, transcript, ipa);

    let pass_a = match_one_to_one(&mut state, &matrix, thresholds.high_confidence);

    let mut pass_b = 0;
    for (i, word) in reference.iter().enumerate() {
        if state.is_matched(i) {
            continue;
        }
        if let Some((start, size, score)) = find_split(
            word,
            transcript,
            &state.used,
            &thresholds.merge_windows,
            thresholds.merge,
        ) {
            state.commit(i, start, size, score);
            pass_b += 1;
        }
    }

    let pass_c = match_one_to_one(&mut state, &matrix, thresholds.low_confidence);

    log::debug!(
        "Aligned {} reference / {} transcript words: {} confident, {} split, {} weak, {} missing",
        reference.len(),
        transcript.len(),
        pass_a,
        pass_b,
        pass_c,
        reference.len() - pass_a - pass_b - pass_c
    );

    state.result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::g2p::PhonemeConverter;

    /// Uses the spelling as its own IPA, so combined == text similarity.
    struct Spelling;

    impl PhonemeConverter for Spelling {
        fn name(&self) -> &str {
            "spelling"
        }
        fn to_ipa(&self, word: &str) -> Option<String> {
            Some(word.to_string())
        }
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(|w| w.to_string()).collect()
    }

    fn align(reference: &str, transcript: &str) -> Vec<AlignedWord> {
        align_words(
            &words(reference),
            &words(transcript),
            &IpaAdapter::new(Spelling),
            &Thresholds::default(),
        )
    }

    #[test]
    fn test_align_identical() {
        let result = align("the cat sat", "the cat sat");
        assert_eq!(result.len(), 3);
        for (i, a) in result.iter().enumerate() {
            assert_eq!(a.transcript_index, Some(i));
            assert_eq!(a.score, 1.0);
            assert_eq!(a.span, 1);
        }
    }

    #[test]
    fn test_align_empty_transcript() {
        let result = align("hello world", "");
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|a| a.is_missing()));
    }

    #[test]
    fn test_align_empty_reference() {
        assert!(align("", "hello world").is_empty());
    }

    #[test]
    fn test_align_split_word() {
        // under / stand alone score 0.667, below the confident pass
        let result = align("understand", "under stand");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].transcript_index, Some(0));
        assert_eq!(result[0].span, 2);
        assert_eq!(result[0].score, 1.0);
    }

    #[test]
    fn test_align_split_window_of_three() {
        let thresholds = Thresholds {
            merge_windows: vec![3],
            ..Default::default()
        };
        let result = align_words(
            &words("abcdefghi"),
            &words("abc def ghi"),
            &IpaAdapter::new(Spelling),
            &thresholds,
        );
        assert_eq!(result[0].transcript_index, Some(0));
        assert_eq!(result[0].span, 3);
    }

    #[test]
    fn test_align_split_skips_used_words() {
        // "under" is taken by its own reference word first
        let result = align("under understand", "under under stand");
        assert_eq!(result[0].transcript_index, Some(0));
        assert_eq!(result[0].score, 1.0);
        assert_eq!(result[1].transcript_index, Some(1));
        assert_eq!(result[1].span, 2);
    }

    #[test]
    fn test_align_low_confidence_fallback() {
        let result = align("cat", "cut");
        assert_eq!(result[0].transcript_index, Some(0));
        assert!((result[0].score - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_align_below_all_thresholds_is_missing() {
        let result = align("cat", "dog");
        assert!(result[0].is_missing());
    }

    #[test]
    fn test_confident_pass_runs_before_fallback() {
        // "cat" would accept "cut" in the weak pass, but "cut" claims it first
        let result = align("cat cut", "cut");
        assert!(result[0].is_missing());
        assert_eq!(result[1].transcript_index, Some(0));
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let result = align("ab", "ab ab");
        assert_eq!(result[0].transcript_index, Some(0));
    }

    #[test]
    fn test_alignment_completeness() {
        let cases = [
            ("the weather is beautiful today", "the wether is butiful today"),
            ("a b c d e", "e d"),
            ("one two three", "one two three four five"),
            ("x", "y z w"),
        ];
        for (reference, transcript) in cases {
            let result = align(reference, transcript);
            let n = words(reference).len();
            assert_eq!(result.len(), n);
            let mut seen = std::collections::HashSet::new();
            for (i, a) in result.iter().enumerate() {
                assert_eq!(a.reference_index, i);
                assert!((0.0..=1.0).contains(&a.score));
                if let Some(j) = a.transcript_index {
                    for k in j..j + a.span {
                        assert!(seen.insert(k), "transcript word {} used twice", k);
                    }
                }
            }
        }
    }

    #[test]
    fn test_similarity_matrix_shape() {
        let m = similarity_matrix(&words("a b"), &words("a b c"), &IpaAdapter::new(Spelling));
        assert_eq!(m.len(), 2);
        assert!(m.iter().all(|row| row.len() == 3));
        assert_eq!(m[0][0], 1.0);
    }

    struct Counting(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl PhonemeConverter for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn to_ipa(&self, word: &str) -> Option<String> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Some(word.to_string())
        }
    }

    #[test]
    fn test_similarity_matrix_converts_each_word_once() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let ipa = IpaAdapter::new(Counting(calls.clone()));
        similarity_matrix(&words("the cat and the dog"), &words("the dog the cat"), &ipa);
        // the, cat, and, dog
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
    }
}
