//! End-to-end assessment of one utterance.

use anyhow::Result;
use serde::Serialize;

use super::aligner::align_words;
use super::classify::classify;
use super::report::render_report;
use crate::config::{AssessConfig, Thresholds};
use crate::history::{HistoryError, HistoryStore};
use crate::language::g2p::{IpaAdapter, LexiconConverter};
use crate::language::normalize::words;
use crate::types::{AlignedWord, HistoryRecord, WordError};

/// Outcome of one assessment.
#[derive(Debug, Serialize)]
pub struct AssessmentResult {
    pub rendered_report: String,
    pub errors: Vec<WordError>,
    /// `None` when nothing was persisted; a failure here does not affect
    /// the report or the errors
    #[serde(skip)]
    pub persisted: Option<Result<HistoryRecord, HistoryError>>,
}

impl AssessmentResult {
    pub fn is_correct(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn persistence_error(&self) -> Option<&HistoryError> {
        self.persisted.as_ref().and_then(|r| r.as_ref().err())
    }
}

/// Assesses utterances against a shared converter, thresholds and
/// (optionally) a history log. Assessment itself holds no mutable state, so
/// one assessor can serve several threads.
#[derive(Debug)]
pub struct Assessor {
    ipa: IpaAdapter,
    thresholds: Thresholds,
    history: Option<HistoryStore>,
}

impl Default for Assessor {
    fn default() -> Self {
        Self::new(IpaAdapter::default(), Thresholds::default())
    }
}

impl Assessor {
    pub fn new(ipa: IpaAdapter, thresholds: Thresholds) -> Self {
        Self {
            ipa,
            thresholds,
            history: None,
        }
    }

    pub fn with_history(mut self, store: HistoryStore) -> Self {
        self.history = Some(store);
        self
    }

    /// Build from configuration: lexicon file (or the embedded one),
    /// thresholds and history location.
    pub fn from_config(config: &AssessConfig) -> Result<Self> {
        let ipa = match &config.lexicon_path {
            Some(path) => IpaAdapter::new(LexiconConverter::from_path(path)?),
            None => IpaAdapter::default(),
        };
        let store = HistoryStore::new(config.history_path());
        log::debug!(
            "Assessor using {} converter, history at {}",
            ipa.converter_name(),
            store.path().display()
        );
        Ok(Self::new(ipa, config.thresholds.clone()).with_history(store))
    }

    pub fn ipa(&self) -> &IpaAdapter {
        &self.ipa
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    /// Word alignment of two raw texts (normalized first).
    pub fn align(&self, reference: &str, transcribed: &str) -> Vec<AlignedWord> {
        align_words(
            &words(reference),
            &words(transcribed),
            &self.ipa,
            &self.thresholds,
        )
    }

    /// Missing and mispronounced reference words, in reference order.
    pub fn identify_errors(&self, reference: &str, transcribed: &str) -> Vec<WordError> {
        let reference_words = words(reference);
        let transcript_words = words(transcribed);
        let alignment = align_words(
            &reference_words,
            &transcript_words,
            &self.ipa,
            &self.thresholds,
        );
        classify(
            &alignment,
            &reference_words,
            &transcript_words,
            &self.ipa,
            &self.thresholds,
        )
    }

    /// Assess `transcribed` against `reference` and render the report.
    ///
    /// With `persist` set and a history log attached, the outcome is
    /// upserted into the log. Blank references are never recorded.
    pub fn assess_pronunciation(
        &self,
        reference: &str,
        transcribed: &str,
        persist: bool,
    ) -> AssessmentResult {
        let errors = self.identify_errors(reference, transcribed);
        let rendered_report = render_report(reference, &errors);

        let persisted = match (&self.history, persist) {
            (Some(store), true) if !reference.trim().is_empty() => {
                let outcome = store.record(reference, transcribed, &errors);
                if let Err(e) = &outcome {
                    log::warn!("Assessment not saved: {}", e);
                }
                Some(outcome)
            }
            _ => None,
        };

        AssessmentResult {
            rendered_report,
            errors,
            persisted,
        }
    }
}
