//! rating-cli: recompute ranks, F-Scores and valuations for a batch of company documents.
//!
//! Documents are read from a JSON array, updated in an in-memory store, and
//! written to stdout as one JSON object per line.
//!
//! Usage:
//!   cargo run -p rating-cli -- --input companies.json
//!   cargo run -p rating-cli -- --input companies.json --valuations --concurrency 8
//!   cargo run -p rating-cli -- --input companies.json --analysis
//!   cargo run -p rating-cli -- --overlap fund_a.json fund_b.json

use std::path::Path;
use std::sync::Arc;

use analysis_core::FinancialDocument;
use analysis_orchestrator::{
    CompanyAnalysis, InMemoryDocumentStore, OrchestratorConfig, RatingUpdater,
};
use anyhow::Context;
use fund_overlap::MutualFund;
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rating_cli=info,analysis_orchestrator=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if let Some(idx) = args.iter().position(|a| a == "--overlap") {
        let (Some(first), Some(second)) = (args.get(idx + 1), args.get(idx + 2)) else {
            usage();
        };
        return compare_funds(first, second).await;
    }

    let Some(input) = args
        .iter()
        .position(|a| a == "--input")
        .and_then(|i| args.get(i + 1))
    else {
        usage();
    };

    let mut config = OrchestratorConfig::from_env()?;
    if let Some(concurrency) = args
        .iter()
        .position(|a| a == "--concurrency")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse::<usize>().ok())
    {
        config.concurrency = concurrency.max(1);
    }
    if args.iter().any(|a| a == "--valuations") {
        config.refresh_valuations = true;
    }
    let analysis_only = args.iter().any(|a| a == "--analysis");

    let documents = read_documents(Path::new(input)).await?;
    tracing::info!(
        "rating-cli: {} documents from {}, concurrency={}, valuations={}",
        documents.len(),
        input,
        config.concurrency,
        config.refresh_valuations
    );

    if analysis_only {
        for value in documents {
            match FinancialDocument::try_from(value) {
                Ok(doc) => {
                    let analysis = CompanyAnalysis::from_document(&doc);
                    println!("{}", serde_json::to_string(&analysis)?);
                }
                Err(e) => tracing::warn!("Skipping input entry: {}", e),
            }
        }
        return Ok(());
    }

    let store = Arc::new(InMemoryDocumentStore::from_json_array(documents));
    let updater = RatingUpdater::new(Arc::clone(&store), &config);

    let ratings = updater.update_ratings().await?;
    tracing::info!("Ratings: {:?}", ratings);
    if config.refresh_valuations {
        let valuations = updater.update_valuations().await?;
        tracing::info!("Valuations: {:?}", valuations);
    }

    for (_, document) in store.snapshot() {
        println!("{}", serde_json::to_string(&document)?);
    }
    Ok(())
}

async fn read_documents(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    match parsed {
        Value::Array(items) => Ok(items),
        _ => anyhow::bail!("{} must contain a JSON array of documents", path.display()),
    }
}

async fn compare_funds(first: &str, second: &str) -> anyhow::Result<()> {
    let fund1 = read_fund(Path::new(first)).await?;
    let fund2 = read_fund(Path::new(second)).await?;
    let report = fund_overlap::compare_funds(&fund1, &fund2);
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

async fn read_fund(path: &Path) -> anyhow::Result<MutualFund> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing fund {}", path.display()))
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  rating-cli --input FILE                 Rate every document in a JSON array");
    eprintln!("  rating-cli --overlap FUND1 FUND2        Compare two fund portfolios");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --valuations       Also recompute target prices");
    eprintln!("  --analysis         Print the merged analysis per document instead of updating");
    eprintln!(
        "  --concurrency N    Max parallel documents (default: {})",
        analysis_orchestrator::DEFAULT_CONCURRENCY
    );
    std::process::exit(1);
}
