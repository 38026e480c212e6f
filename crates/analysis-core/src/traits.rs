use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, FinancialDocument, QualityScore, ValuationResult};

/// A document as kept by the store, keyed by its store id.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub document: FinancialDocument,
}

/// Fields written back after a rating pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingUpdate {
    pub rank: f64,
    pub f_score: QualityScore,
    pub last_updated: DateTime<Utc>,
}

/// Persistence seam for the batch updater. Each write is independent, so
/// implementations only need per-document atomicity.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<StoredDocument>, AnalysisError>;

    async fn save_rating(&self, id: &str, update: &RatingUpdate) -> Result<(), AnalysisError>;

    async fn save_valuation(
        &self,
        id: &str,
        valuation: &ValuationResult,
    ) -> Result<(), AnalysisError>;
}
