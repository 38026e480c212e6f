pub mod fscore;
pub mod valuation;

pub use fscore::{
    compute_f_score, leverage_score, operating_efficiency_score, profitability_score,
};
pub use valuation::{
    discounted_cash_flow, CompanyInputs, GrowthCase, ValuationAssumptions, ValuationEngine, CRORE,
};

use analysis_core::{FinancialDocument, QualityScore, Recommendation, ValuationResult};

/// Statement-driven analysis of one company: quality score and target price.
pub struct FundamentalAnalysisEngine {
    valuation: ValuationEngine,
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self {
            valuation: ValuationEngine::new(),
        }
    }

    pub fn with_valuation(valuation: ValuationEngine) -> Self {
        Self { valuation }
    }

    pub fn quality_score(&self, doc: &FinancialDocument) -> QualityScore {
        compute_f_score(doc)
    }

    pub fn valuation(&self, doc: &FinancialDocument) -> ValuationResult {
        self.valuation.value(doc)
    }

    /// Short form of [`Self::valuation`]: `(recommendation, target price, upside %)`.
    pub fn investment_recommendation(&self, doc: &FinancialDocument) -> (Recommendation, f64, f64) {
        let result = self.valuation(doc);
        tracing::info!("{}", result.summary());
        (
            result.recommendation,
            result.target_price,
            result.upside_downside,
        )
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
