//! Lexical and phonemic similarity between word candidates.

use crate::assess::sequence::SequenceMatcher;
use crate::language::g2p::IpaAdapter;

/// Sequence-matcher ratio over the characters of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

/// Spelling similarity, case-insensitive.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    ratio(&a.to_lowercase(), &b.to_lowercase())
}

/// Similarity of two IPA strings.
pub fn phonetic_similarity(ipa_a: &str, ipa_b: &str) -> f64 {
    ratio(ipa_a, ipa_b)
}

/// Mean of spelling and IPA similarity when the IPA is already known.
pub fn combine(text_a: &str, text_b: &str, ipa_a: &str, ipa_b: &str) -> f64 {
    (text_similarity(text_a, text_b) + phonetic_similarity(ipa_a, ipa_b)) / 2.0
}

/// Mean of spelling and IPA similarity, converting both words.
pub fn combined_score(a: &str, b: &str, ipa: &IpaAdapter) -> f64 {
    combine(a, b, &ipa.to_ipa(a), &ipa.to_ipa(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_similarity_case_insensitive() {
        assert_eq!(text_similarity("Hello", "hello"), 1.0);
    }

    #[test]
    fn test_text_similarity_disjoint() {
        assert_eq!(text_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_phonetic_similarity_is_case_sensitive() {
        // IPA symbols are compared verbatim
        assert!(phonetic_similarity("θ", "Θ") < 1.0);
    }

    #[test]
    fn test_combined_score_identical() {
        let ipa = IpaAdapter::default();
        assert_eq!(combined_score("weather", "weather", &ipa), 1.0);
    }

    #[test]
    fn test_combined_score_spelling_drift() {
        let ipa = IpaAdapter::default();
        // weather -> wɛðər, wether is not in the lexicon and falls back
        let s = combined_score("weather", "wether", &ipa);
        let expected = (12.0 / 13.0 + 4.0 / 11.0) / 2.0;
        assert!((s - expected).abs() < 1e-9, "score {}", s);
    }

    #[test]
    fn test_combined_score_homophones() {
        let ipa = IpaAdapter::default();
        // would / wood share IPA, so only spelling differs
        let s = combined_score("would", "wood", &ipa);
        let text = text_similarity("would", "wood");
        assert!((s - (text + 1.0) / 2.0).abs() < 1e-9);
        assert!(s > text);
    }

    #[test]
    fn test_scores_within_unit_interval() {
        let ipa = IpaAdapter::default();
        for (a, b) in [("the", "a"), ("cat", "dog"), ("x", "xx"), ("today", "to day")] {
            let s = combined_score(a, b, &ipa);
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
