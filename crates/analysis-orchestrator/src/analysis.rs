use analysis_core::{FinancialDocument, MarketCapCategory, QualityScore, ValuationResult};
use fundamental_analysis::FundamentalAnalysisEngine;
use serde::{Deserialize, Serialize};
use stock_rating::StockRater;

/// Everything computed for one company, as a caller would persist or display it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAnalysis {
    pub name: String,
    pub market_cap_category: MarketCapCategory,
    pub rank: f64,
    pub f_score: QualityScore,
    /// `f_score` for display; "Not Available" when unavailable
    pub f_score_label: String,
    pub valuation: ValuationResult,
}

impl CompanyAnalysis {
    pub fn from_document(doc: &FinancialDocument) -> Self {
        Self::with_engines(doc, &StockRater::new(), &FundamentalAnalysisEngine::new())
    }

    pub fn with_engines(
        doc: &FinancialDocument,
        rater: &StockRater,
        fundamentals: &FundamentalAnalysisEngine,
    ) -> Self {
        let market_cap_category = doc
            .text("marketCap")
            .or_else(|| doc.text("Market Cap"))
            .map(MarketCapCategory::from_market_cap)
            .unwrap_or(MarketCapCategory::Unknown);
        let f_score = fundamentals.quality_score(doc);

        Self {
            name: doc.name().unwrap_or_default().to_string(),
            market_cap_category,
            rank: rater.rate(doc),
            f_score,
            f_score_label: f_score.to_string(),
            valuation: fundamentals.valuation(doc),
        }
    }
}
