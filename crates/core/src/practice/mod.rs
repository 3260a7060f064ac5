//! Practice material chosen from the learner's error history.

pub mod corpus;
pub mod profile;
pub mod select;

pub use corpus::SentenceCorpus;
pub use profile::ErrorProfile;
pub use select::ContentSelector;
