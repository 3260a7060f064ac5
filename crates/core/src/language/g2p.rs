//! Grapheme-to-IPA conversion.
//!
//! Pronunciations come from a CMU-format pronouncing dictionary (a seed
//! lexicon is embedded at compile time) and are rendered as IPA. The
//! [`IpaAdapter`] wraps any [`PhonemeConverter`] and never fails: words
//! without a pronunciation come back as their own spelling.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};

/// The embedded seed lexicon.
///
/// Format: one word per line, "WORD  PH1 PH2 PH3 ..."
/// Lines starting with ";;;" are comments.
const SEED_LEXICON_DATA: &str = include_str!("lexicon.txt");

static SEED_LEXICON: OnceLock<Arc<HashMap<String, Vec<String>>>> = OnceLock::new();

lazy_static::lazy_static! {
    /// ARPABET (stress stripped) to IPA.
    static ref ARPABET_TO_IPA: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // Vowels and diphthongs
        m.insert("AA", "ɑ"); m.insert("AE", "æ"); m.insert("AH", "ʌ");
        m.insert("AO", "ɔ"); m.insert("AW", "aʊ"); m.insert("AY", "aɪ");
        m.insert("EH", "ɛ"); m.insert("ER", "ər"); m.insert("EY", "eɪ");
        m.insert("IH", "ɪ"); m.insert("IY", "i"); m.insert("OW", "oʊ");
        m.insert("OY", "ɔɪ"); m.insert("UH", "ʊ"); m.insert("UW", "u");
        // Stops and affricates
        m.insert("P", "p"); m.insert("B", "b"); m.insert("T", "t");
        m.insert("D", "d"); m.insert("K", "k"); m.insert("G", "g");
        m.insert("CH", "tʃ"); m.insert("JH", "dʒ");
        // Fricatives
        m.insert("F", "f"); m.insert("V", "v"); m.insert("TH", "θ");
        m.insert("DH", "ð"); m.insert("S", "s"); m.insert("Z", "z");
        m.insert("SH", "ʃ"); m.insert("ZH", "ʒ"); m.insert("HH", "h");
        // Nasals, liquids, glides
        m.insert("M", "m"); m.insert("N", "n"); m.insert("NG", "ŋ");
        m.insert("L", "l"); m.insert("R", "r"); m.insert("W", "w");
        m.insert("Y", "j");
        m
    };
}

/// A grapheme-to-IPA backend.
pub trait PhonemeConverter: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// IPA for a single word, or `None` when the backend cannot convert it.
    fn to_ipa(&self, word: &str) -> Option<String>;
}

/// Parse CMU dictionary text into word -> first pronunciation variant.
fn parse_lexicon(data: &str) -> HashMap<String, Vec<String>> {
    let mut dict: HashMap<String, Vec<String>> = HashMap::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(";;;") {
            continue;
        }
        let mut parts = line.split_whitespace();
        let word_raw = match parts.next() {
            Some(w) => w,
            None => continue,
        };

        // Strip variant marker: WORD(2) -> WORD
        let word = word_raw
            .split('(')
            .next()
            .unwrap_or(word_raw)
            .to_uppercase();

        let phonemes: Vec<String> = parts.map(|s| s.to_string()).collect();
        if phonemes.is_empty() {
            continue;
        }
        // First variant wins
        dict.entry(word).or_insert(phonemes);
    }
    dict
}

/// Strip trailing stress marker (0, 1, 2) from an ARPABET phoneme.
pub fn strip_stress(phoneme: &str) -> &str {
    phoneme.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Render ARPABET phonemes as an IPA string.
///
/// Unstressed `AH0` becomes schwa. Returns `None` if any phoneme is unknown.
pub fn arpabet_to_ipa<S: AsRef<str>>(phonemes: &[S]) -> Option<String> {
    let mut out = String::new();
    for phoneme in phonemes {
        let phoneme = phoneme.as_ref();
        let base = strip_stress(phoneme);
        if base == "AH" && phoneme.ends_with('0') {
            out.push('ə');
            continue;
        }
        out.push_str(ARPABET_TO_IPA.get(base)?);
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Dictionary-backed converter. Clones share one entry table.
#[derive(Debug, Clone)]
pub struct LexiconConverter {
    entries: Arc<HashMap<String, Vec<String>>>,
}

impl LexiconConverter {
    /// Converter over the embedded seed lexicon.
    pub fn embedded() -> Self {
        let entries = SEED_LEXICON
            .get_or_init(|| Arc::new(parse_lexicon(SEED_LEXICON_DATA)))
            .clone();
        Self { entries }
    }

    /// Converter over CMU dictionary text.
    pub fn parse(data: &str) -> Self {
        Self {
            entries: Arc::new(parse_lexicon(data)),
        }
    }

    /// Load a CMU-format dictionary file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon: {}", path.display()))?;
        let converter = Self::parse(&data);
        log::info!(
            "Loaded {} lexicon entries from {}",
            converter.len(),
            path.display()
        );
        Ok(converter)
    }

    /// ARPABET phonemes for a word (case-insensitive).
    pub fn lookup(&self, word: &str) -> Option<&[String]> {
        self.entries.get(&word.to_uppercase()).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LexiconConverter {
    fn default() -> Self {
        Self::embedded()
    }
}

impl PhonemeConverter for LexiconConverter {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn to_ipa(&self, word: &str) -> Option<String> {
        self.lookup(word).and_then(arpabet_to_ipa)
    }
}

/// Never-failing IPA lookup with spelling fallback.
pub struct IpaAdapter {
    converter: Box<dyn PhonemeConverter>,
}

impl IpaAdapter {
    pub fn new(converter: impl PhonemeConverter + 'static) -> Self {
        Self {
            converter: Box::new(converter),
        }
    }

    /// IPA for `word`, or `word` itself when conversion fails.
    pub fn to_ipa(&self, word: &str) -> String {
        match self.converter.to_ipa(word) {
            Some(ipa) if !ipa.is_empty() => ipa,
            _ => {
                log::warn!(
                    "No IPA for '{}' from {} converter, using spelling",
                    word,
                    self.converter.name()
                );
                word.to_string()
            }
        }
    }

    /// IPA for `word` without the spelling fallback.
    pub fn try_ipa(&self, word: &str) -> Option<String> {
        self.converter.to_ipa(word).filter(|ipa| !ipa.is_empty())
    }

    pub fn converter_name(&self) -> &str {
        self.converter.name()
    }
}

impl Default for IpaAdapter {
    fn default() -> Self {
        Self::new(LexiconConverter::embedded())
    }
}

impl std::fmt::Debug for IpaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpaAdapter")
            .field("converter", &self.converter.name())
            .finish()
    }
}
