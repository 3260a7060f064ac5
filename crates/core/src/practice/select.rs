//! Adaptive choice of the next practice sentence or word.
//!
//! The learner's recent error rate is the probability of targeted
//! selection. Targeted mode prefers material rich in the sounds the learner
//! got wrong; otherwise material is drawn uniformly from the corpus.

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::corpus::SentenceCorpus;
use super::profile::ErrorProfile;
use crate::language::g2p::IpaAdapter;

/// Candidates drawn per targeted selection.
pub const SAMPLE_SIZE: usize = 30;
/// Highest-scoring sentences kept for the weighted draw.
pub const TOP_SENTENCES: usize = 10;

/// Words of `sentence` paired with their IPA. Words the converter does not
/// know are left out.
pub fn sentence_ipa(sentence: &str, ipa: &IpaAdapter) -> Vec<(String, String)> {
    sentence
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| ".,!?;:\"()[]{}".contains(c)))
        .filter(|w| !w.is_empty())
        .filter_map(|w| ipa.try_ipa(&w.to_lowercase()).map(|p| (w.to_string(), p)))
        .collect()
}

/// How well a sentence covers the weak sounds: for each target sound, its
/// occurrences in the sentence capped at the target frequency.
pub fn score_sentence(word_ipa_pairs: &[(String, String)], profile: &ErrorProfile) -> usize {
    profile
        .sound_counts
        .iter()
        .map(|(sound, target)| {
            let found: usize = word_ipa_pairs
                .iter()
                .map(|(_, ipa)| ipa.matches(sound.as_str()).count())
                .sum();
            found.min(*target)
        })
        .sum()
}

/// Score every candidate and keep the best `top_n`, highest first. Equal
/// scores keep candidate order.
pub fn rank_sentences(
    candidates: &[(String, Vec<(String, String)>)],
    profile: &ErrorProfile,
    top_n: usize,
) -> Vec<(String, usize)> {
    let mut scored: Vec<(String, usize)> = candidates
        .iter()
        .map(|(sentence, pairs)| (sentence.clone(), score_sentence(pairs, profile)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(top_n);
    scored
}

/// Picks practice material for one learner.
#[derive(Debug)]
pub struct ContentSelector {
    corpus: SentenceCorpus,
    ipa: IpaAdapter,
    profile: ErrorProfile,
}

impl ContentSelector {
    pub fn new(corpus: SentenceCorpus, ipa: IpaAdapter, profile: ErrorProfile) -> Self {
        Self {
            corpus,
            ipa,
            profile,
        }
    }

    pub fn profile(&self) -> &ErrorProfile {
        &self.profile
    }

    pub fn corpus(&self) -> &SentenceCorpus {
        &self.corpus
    }

    fn use_targeted(&self, rng: &mut StdRng) -> bool {
        let roll: f64 = rng.gen();
        let targeted = self.profile.targets(roll);
        log::info!(
            "Error rate {:.1}%, {} weak sounds: {} selection",
            self.profile.error_rate,
            self.profile.sound_counts.len(),
            if targeted { "targeted" } else { "random" }
        );
        targeted
    }

    /// Next practice sentence.
    pub fn next_sentence(&self, rng: &mut StdRng) -> Result<String> {
        if !self.use_targeted(rng) {
            return self.corpus.random_sentence(rng);
        }

        let candidates: Vec<(String, Vec<(String, String)>)> = self
            .corpus
            .sample_sentences(SAMPLE_SIZE, rng)?
            .into_iter()
            .map(|s| {
                let pairs = sentence_ipa(&s, &self.ipa);
                (s, pairs)
            })
            .filter(|(_, pairs)| !pairs.is_empty())
            .collect();
        if candidates.is_empty() {
            return self.corpus.random_sentence(rng);
        }

        let best = rank_sentences(&candidates, &self.profile, TOP_SENTENCES);
        for (sentence, score) in best.iter().take(3) {
            log::debug!("Candidate (score {}): {}", score, sentence);
        }

        best.choose_weighted(rng, |(_, score)| score + 1)
            .map(|(sentence, _)| sentence.clone())
            .map_err(|e| anyhow!("Weighted sentence choice failed: {}", e))
    }

    /// Next practice word.
    pub fn next_word(&self, rng: &mut StdRng) -> Result<String> {
        if !self.use_targeted(rng) {
            return self.corpus.random_word(rng);
        }

        let words_with_ipa: Vec<(String, String)> = self
            .corpus
            .collect_words(SAMPLE_SIZE * 2, rng)?
            .into_iter()
            .filter_map(|w| self.ipa.try_ipa(&w).map(|p| (w, p)))
            .take(SAMPLE_SIZE)
            .collect();
        if words_with_ipa.is_empty() {
            return self.corpus.random_word(rng);
        }

        let mut selected: Vec<&str> = Vec::new();
        for (sound, frequency) in &self.profile.sound_counts {
            let available: Vec<&str> = words_with_ipa
                .iter()
                .filter(|(_, ipa)| ipa.contains(sound.as_str()))
                .map(|(w, _)| w.as_str())
                .collect();
            let take = (*frequency).min(available.len());
            selected.extend(available.choose_multiple(rng, take).copied());
        }

        let mut unique: Vec<&str> = Vec::new();
        for w in selected {
            if !unique.contains(&w) {
                unique.push(w);
            }
        }

        let pick = if unique.is_empty() {
            log::debug!("No word carries a weak sound, choosing any");
            words_with_ipa.choose(rng).map(|(w, _)| w.as_str())
        } else {
            log::debug!("Words with weak sounds: {:?}", unique);
            unique.choose(rng).copied()
        };
        pick.map(str::to_string)
            .ok_or_else(|| anyhow!("No practice word available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn profile(error_rate: f64, sounds: &[(&str, usize)]) -> ErrorProfile {
        ErrorProfile {
            error_rate,
            sound_counts: sounds.iter().map(|(s, n)| (s.to_string(), *n)).collect(),
        }
    }

    fn pairs(words: &[(&str, &str)]) -> Vec<(String, String)> {
        words
            .iter()
            .map(|(w, p)| (w.to_string(), p.to_string()))
            .collect()
    }

    fn write_corpus(name: &str, lines: &[&str]) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("elocute_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sentences.tsv");
        let body: Vec<String> = lines
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}\teng\t{}", i + 1, s))
            .collect();
        std::fs::write(&path, body.join("\n")).unwrap();
        (dir, path)
    }

    #[test]
    fn test_score_sentence_caps_at_target_frequency() {
        let p = profile(50.0, &[("ð", 1), ("θ", 3)]);
        // ð appears twice but only counts once; θ appears twice
        let s = pairs(&[("the", "ðə"), ("this", "ðɪs"), ("think", "θɪŋk"), ("three", "θri")]);
        assert_eq!(score_sentence(&s, &p), 1 + 2);
    }

    #[test]
    fn test_score_sentence_without_profile() {
        let s = pairs(&[("the", "ðə")]);
        assert_eq!(score_sentence(&s, &ErrorProfile::default()), 0);
    }

    #[test]
    fn test_rank_sentences() {
        let p = profile(100.0, &[("θ", 5)]);
        let candidates = vec![
            ("a".to_string(), pairs(&[("cat", "kæt")])),
            ("b".to_string(), pairs(&[("think", "θɪŋk"), ("three", "θri")])),
            ("c".to_string(), pairs(&[("thank", "θæŋk")])),
            ("d".to_string(), pairs(&[("dog", "dɔg")])),
        ];
        let ranked = rank_sentences(&candidates, &p, 3);
        assert_eq!(
            ranked,
            vec![("b".to_string(), 2), ("c".to_string(), 1), ("a".to_string(), 0)]
        );
    }

    #[test]
    fn test_sentence_ipa_skips_unknown_words() {
        let ipa = IpaAdapter::default();
        let p = sentence_ipa("The cat, Zorblax!", &ipa);
        assert_eq!(p, pairs(&[("The", "ðə"), ("cat", "kæt")]));
    }

    #[test]
    fn test_next_sentence_random_mode_without_errors() {
        let (dir, path) = write_corpus("select_random", &["I like the green garden.", "We eat bread at home."]);
        let selector = ContentSelector::new(
            SentenceCorpus::new(&path),
            IpaAdapter::default(),
            ErrorProfile::default(),
        );
        let mut rng = StdRng::seed_from_u64(5);
        let s = selector.next_sentence(&mut rng).unwrap();
        assert!(s == "I like the green garden." || s == "We eat bread at home.");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_next_sentence_targeted_is_reproducible() {
        let (dir, path) = write_corpus(
            "select_targeted",
            &[
                "I think three people sing there.",
                "We eat bread at home.",
                "My brother and father read with them.",
            ],
        );
        let selector = ContentSelector::new(
            SentenceCorpus::new(&path),
            IpaAdapter::default(),
            profile(100.0, &[("θ", 2), ("ð", 2)]),
        );

        let a = selector.next_sentence(&mut StdRng::seed_from_u64(9)).unwrap();
        let b = selector.next_sentence(&mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with('.'));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_next_word_targets_weak_sound() {
        let (dir, path) = write_corpus(
            "select_word",
            &["we think three people sing.", "we eat bread at home."],
        );
        let selector = ContentSelector::new(
            SentenceCorpus::new(&path),
            IpaAdapter::default(),
            profile(100.0, &[("θ", 2)]),
        );
        let ipa = IpaAdapter::default();

        for seed in 0..5 {
            let word = selector.next_word(&mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(ipa.to_ipa(&word).contains('θ'), "picked {}", word);
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_next_word_without_corpus_uses_fallback() {
        let selector = ContentSelector::new(
            SentenceCorpus::new("/nonexistent/sentences.tsv"),
            IpaAdapter::default(),
            ErrorProfile::default(),
        );
        let word = selector.next_word(&mut StdRng::seed_from_u64(0)).unwrap();
        assert!(!word.is_empty());
    }
}
