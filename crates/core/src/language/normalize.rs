//! Text normalization for word-level comparison.

/// Lowercase, drop everything that is not alphanumeric or whitespace,
/// and collapse whitespace runs to single spaces.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize and split into words.
pub fn words(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Normalize a single whitespace-delimited token (punctuation stripped,
/// lowercased). Used to match displayed words against error words.
pub fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(
            normalize("The weather is beautiful today."),
            "the weather is beautiful today"
        );
        assert_eq!(normalize("I would like a cup of coffee, please."), "i would like a cup of coffee please");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  hello \t\n  world  "), "hello world");
    }

    #[test]
    fn test_normalize_removes_apostrophes() {
        assert_eq!(normalize("Don't stop"), "dont stop");
    }

    #[test]
    fn test_normalize_keeps_digits_and_letters() {
        assert_eq!(normalize("Room 101, Café!"), "room 101 café");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "The weather is beautiful today.",
            "  İstanbul -- ÀÉÎ  ...  ok ",
            "a\u{301}b c\u{0327}",
            "",
            "!!!",
            "tab\tsep\nlines",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_normalize_empty_and_punct_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!., ;"), "");
        assert!(words("?!.").is_empty());
    }

    #[test]
    fn test_words_split() {
        assert_eq!(words("Hello, world!"), vec!["hello", "world"]);
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("Today."), "today");
        assert_eq!(normalize_token("\"Weather\""), "weather");
    }
}
