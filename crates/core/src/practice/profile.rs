use crate::history::tally::Tally;
use crate::types::HistoryRecord;

/// The learner's recent weak spots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorProfile {
    /// Percent of failed attempts in the window
    pub error_rate: f64,
    /// Wrong sounds among failed attempts with occurrence counts, first seen
    /// first
    pub sound_counts: Vec<(String, usize)>,
}

impl ErrorProfile {
    /// Profile of the last `window` records, or all of them when there are
    /// fewer.
    pub fn from_history(records: &[HistoryRecord], window: usize) -> Self {
        let recent = &records[records.len().saturating_sub(window)..];
        if recent.is_empty() {
            return Self::default();
        }

        let failed: Vec<&HistoryRecord> = recent.iter().filter(|r| !r.result).collect();
        let error_rate = failed.len() as f64 / recent.len() as f64 * 100.0;

        let mut sounds = Tally::new();
        for sound in failed
            .iter()
            .flat_map(|r| &r.wrong_words)
            .flat_map(|w| &w.wrong_ipa)
        {
            sounds.add(sound);
        }

        Self {
            error_rate,
            sound_counts: sounds.iter().map(|(s, n)| (s.to_string(), n)).collect(),
        }
    }

    /// No weak sounds to target.
    pub fn is_empty(&self) -> bool {
        self.sound_counts.is_empty()
    }

    /// Whether a uniform roll in [0, 1) lands in targeted mode. The error
    /// rate is the probability of targeting.
    pub fn targets(&self, roll: f64) -> bool {
        !self.is_empty() && roll * 100.0 < self.error_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WrongWord;

    fn rec(result: bool, sounds: &[&str]) -> HistoryRecord {
        HistoryRecord {
            sentence: "s".to_string(),
            result,
            wrong_words: if sounds.is_empty() {
                Vec::new()
            } else {
                vec![WrongWord {
                    word: "w".to_string(),
                    wrong_ipa: sounds.iter().map(|s| s.to_string()).collect(),
                }]
            },
        }
    }

    #[test]
    fn test_empty_history() {
        let p = ErrorProfile::from_history(&[], 20);
        assert_eq!(p.error_rate, 0.0);
        assert!(p.is_empty());
        assert!(!p.targets(0.0));
    }

    #[test]
    fn test_profile_over_short_history() {
        let records = vec![rec(true, &[]), rec(false, &["ð", "ə"]), rec(false, &["ð"]), rec(true, &[])];
        let p = ErrorProfile::from_history(&records, 20);
        assert_eq!(p.error_rate, 50.0);
        assert_eq!(
            p.sound_counts,
            vec![("ð".to_string(), 2), ("ə".to_string(), 1)]
        );
        assert!(p.targets(0.49));
        assert!(!p.targets(0.5));
    }

    #[test]
    fn test_profile_uses_window() {
        let mut records: Vec<HistoryRecord> = (0..5).map(|_| rec(false, &["θ"])).collect();
        records.extend((0..4).map(|_| rec(true, &[])));
        let p = ErrorProfile::from_history(&records, 4);
        assert_eq!(p.error_rate, 0.0);
        assert!(p.is_empty());
    }

    #[test]
    fn test_passing_records_contribute_no_sounds() {
        // a passing record should never carry wrong words, but ignore them if it does
        let p = ErrorProfile::from_history(&[rec(true, &["x"]), rec(false, &[])], 20);
        assert_eq!(p.error_rate, 50.0);
        assert!(p.is_empty());
    }
}
