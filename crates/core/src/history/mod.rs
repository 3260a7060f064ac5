//! Assessment history: the persisted per-sentence log and statistics over it.

pub mod error;
mod lock;
pub mod stats;
pub mod store;
pub mod tally;

pub use error::HistoryError;
pub use store::HistoryStore;
