//! Batch recomputation of ratings and valuations over every stored document.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use analysis_core::{AnalysisError, DocumentStore, RatingUpdate, StoredDocument};
use chrono::Utc;
use fundamental_analysis::FundamentalAnalysisEngine;
use serde::{Deserialize, Serialize};
use stock_rating::StockRater;
use tokio::sync::Semaphore;

use crate::config::OrchestratorConfig;

/// Outcome of one batch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub processed: u64,
    pub updated: u64,
    pub failed: u64,
}

#[derive(Clone, Copy)]
enum Job {
    Rating,
    Valuation,
}

impl Job {
    fn label(self) -> &'static str {
        match self {
            Job::Rating => "rating",
            Job::Valuation => "valuation",
        }
    }
}

pub struct RatingUpdater<S> {
    store: Arc<S>,
    rater: Arc<StockRater>,
    fundamentals: Arc<FundamentalAnalysisEngine>,
    concurrency: usize,
}

impl<S: DocumentStore + 'static> RatingUpdater<S> {
    pub fn new(store: Arc<S>, config: &OrchestratorConfig) -> Self {
        Self {
            store,
            rater: Arc::new(StockRater::new()),
            fundamentals: Arc::new(FundamentalAnalysisEngine::new()),
            concurrency: config.concurrency.max(1),
        }
    }

    pub fn with_engines(
        mut self,
        rater: StockRater,
        fundamentals: FundamentalAnalysisEngine,
    ) -> Self {
        self.rater = Arc::new(rater);
        self.fundamentals = Arc::new(fundamentals);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Recompute rank and F-Score for every document and write them back.
    pub async fn update_ratings(&self) -> Result<UpdateSummary, AnalysisError> {
        self.run(Job::Rating).await
    }

    /// Recompute the valuation for every document and write it back.
    pub async fn update_valuations(&self) -> Result<UpdateSummary, AnalysisError> {
        self.run(Job::Valuation).await
    }

    async fn run(&self, job: Job) -> Result<UpdateSummary, AnalysisError> {
        let documents = self.store.list_documents().await?;
        let total = documents.len();
        tracing::info!(
            "Starting {} update of {} documents (concurrency={})",
            job.label(),
            total,
            self.concurrency
        );

        let completed = Arc::new(AtomicU64::new(0));
        let updated = Arc::new(AtomicU64::new(0));
        let failed = Arc::new(AtomicU64::new(0));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let mut handles = Vec::with_capacity(total);
        for stored in documents {
            let store = Arc::clone(&self.store);
            let rater = Arc::clone(&self.rater);
            let fundamentals = Arc::clone(&self.fundamentals);
            let completed = Arc::clone(&completed);
            let updated = Arc::clone(&updated);
            let failed = Arc::clone(&failed);
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("{} skipped: {}", stored.id, e);
                        return;
                    }
                };

                let result = match job {
                    Job::Rating => {
                        update_rating(store.as_ref(), &rater, &fundamentals, &stored).await
                    }
                    Job::Valuation => {
                        update_valuation(store.as_ref(), &fundamentals, &stored).await
                    }
                };

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                match result {
                    Ok(detail) => {
                        updated.fetch_add(1, Ordering::Relaxed);
                        tracing::info!("[{}/{}] {} => {}", done, total, stored.id, detail);
                    }
                    Err(e) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("[{}/{}] {} failed: {}", done, total, stored.id, e);
                    }
                }
            }));
        }

        for result in futures_util::future::join_all(handles).await {
            if let Err(e) = result {
                failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!("{} task aborted: {}", job.label(), e);
            }
        }

        let summary = UpdateSummary {
            processed: total as u64,
            updated: updated.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        };
        tracing::info!(
            "Done! {} {} updates across {} documents ({} failed)",
            summary.updated,
            job.label(),
            summary.processed,
            summary.failed
        );
        Ok(summary)
    }
}

async fn update_rating<S: DocumentStore>(
    store: &S,
    rater: &StockRater,
    fundamentals: &FundamentalAnalysisEngine,
    stored: &StoredDocument,
) -> Result<String, AnalysisError> {
    let update = RatingUpdate {
        rank: rater.rate(&stored.document),
        f_score: fundamentals.quality_score(&stored.document),
        last_updated: Utc::now(),
    };
    store.save_rating(&stored.id, &update).await?;
    Ok(format!("rank {:.2}, F-Score {}", update.rank, update.f_score))
}

async fn update_valuation<S: DocumentStore>(
    store: &S,
    fundamentals: &FundamentalAnalysisEngine,
    stored: &StoredDocument,
) -> Result<String, AnalysisError> {
    let valuation = fundamentals.valuation(&stored.document);
    store.save_valuation(&stored.id, &valuation).await?;
    Ok(valuation.summary())
}
