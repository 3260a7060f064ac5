//! Pronunciation assessment engine.
//!
//! Aligns a reference text against a speech-to-text transcript, reports
//! mispronounced and missing words with IPA-level differences, and keeps a
//! per-sentence history that drives statistics and practice selection.

pub mod assess;
pub mod config;
pub mod history;
pub mod language;
pub mod practice;
pub mod types;

pub use assess::pipeline::{AssessmentResult, Assessor};
pub use history::stats::{analyze_history, StatisticsReport};
