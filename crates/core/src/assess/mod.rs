//! Word-level pronunciation assessment.
//!
//! `(reference, transcript)` is normalized, aligned word by word, and each
//! missing or poorly matched reference word becomes a [`WordError`] with an
//! IPA diff. [`pipeline::Assessor`] runs the whole chain.
//!
//! [`WordError`]: crate::types::WordError

pub mod aligner;
pub mod classify;
pub mod pipeline;
pub mod report;
pub mod sequence;
pub mod similarity;
