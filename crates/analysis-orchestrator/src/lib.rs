//! Batch rank and valuation updates over a document store.

pub mod analysis;
pub mod config;
pub mod store;
pub mod updater;

pub use analysis::CompanyAnalysis;
pub use config::{OrchestratorConfig, DEFAULT_CONCURRENCY};
pub use store::InMemoryDocumentStore;
pub use updater::{RatingUpdater, UpdateSummary};
