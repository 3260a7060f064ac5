//! Text and speech front end: normalization, grapheme-to-IPA, transcription.

pub mod g2p;
pub mod normalize;
pub mod transcribe;
