//! Stock Rating Module
//!
//! Blends a peer-table comparison with the quarterly trend into one rank.

pub mod models;
pub mod peers;
pub mod trend;

pub use models::{PeerMetrics, StockProfile};
pub use peers::{combine_peer_and_median, compare_peers, score_against, PeerWeights};
pub use trend::analyze_trend;

use analysis_core::FinancialDocument;
use serde_json::Value;

/// Share of each component in the final rank
#[derive(Debug, Clone)]
pub struct RatingWeights {
    pub peer_weight: f64,
    pub trend_weight: f64,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            peer_weight: 0.5,
            trend_weight: 0.4,
        }
    }
}

pub struct StockRater {
    weights: RatingWeights,
}

impl Default for StockRater {
    fn default() -> Self {
        Self::new()
    }
}

impl StockRater {
    pub fn new() -> Self {
        Self {
            weights: RatingWeights::default(),
        }
    }

    pub fn with_weights(weights: RatingWeights) -> Self {
        Self { weights }
    }

    /// Rank rounded to two decimals.
    pub fn rate(&self, doc: &FinancialDocument) -> f64 {
        let stock = StockProfile::from_document(doc);
        let peer_score = compare_peers(&stock, doc.peers());
        let trend_score = doc
            .quarterly_results()
            .map(analyze_trend)
            .unwrap_or(0.0);

        let rank = peer_score * self.weights.peer_weight + trend_score * self.weights.trend_weight;
        tracing::debug!(
            "Rated {}: peers={:.2} trend={:.2} rank={:.2}",
            stock.name,
            peer_score,
            trend_score,
            rank
        );
        round2(rank)
    }
}

/// [`StockRater::rate`] with default weights.
pub fn rate_stock(doc: &FinancialDocument) -> f64 {
    StockRater::new().rate(doc)
}

/// Rate a raw document value; anything but an object rates 0.0.
pub fn rate_value(value: &Value) -> f64 {
    match FinancialDocument::try_from(value.clone()) {
        Ok(doc) => rate_stock(&doc),
        Err(e) => {
            tracing::warn!("Cannot rate: {}", e);
            0.0
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn valid_stock() -> Value {
        json!({
            "name": "Valid Stock",
            "stockPE": "15.5",
            "marketCap": "10000",
            "dividendYield": "2.5%",
            "roce": "20.0",
            "cons": ["High debt", "Low liquidity"],
            "pros": ["Strong brand", "High growth potential"],
            "peers": [
                {"pe": "10.0", "market_cap": "8000", "div_yield": "2.0%", "roce": "18.0", "sales_qtr": "500", "np_qtr": "50"},
                {"pe": "12.0", "market_cap": "9000", "div_yield": "2.2%", "roce": "19.0", "sales_qtr": "600", "np_qtr": "60"},
                {"pe": "11.0", "market_cap": "8500", "div_yield": "2.1%", "roce": "18.5", "sales_qtr": "550", "np_qtr": "55"}
            ],
            "quarterlyResults": {
                "Q1": [{"sales": "1000", "profit": "100"}, {"sales": "1100", "profit": "110"}],
                "Q2": [{"sales": "1200", "profit": "120"}, {"sales": "1300", "profit": "130"}]
            }
        })
    }

    #[test]
    fn test_rate_stock_valid_fields() {
        // Peers 25.5 + median 11.5 = 37 at 0.5; trend 5 at 0.4.
        assert_relative_eq!(rate_value(&valid_stock()), 20.5, epsilon = 1e-9);
    }

    #[test]
    fn test_rate_stock_missing_fields() {
        assert_eq!(rate_value(&json!({"name": "Incomplete Stock"})), 0.0);
        assert_eq!(rate_value(&json!({})), 0.0);
        assert_eq!(rate_value(&json!("not a document")), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let rater = StockRater::with_weights(RatingWeights {
            peer_weight: 0.0,
            trend_weight: 1.0,
        });
        let doc = FinancialDocument::try_from(valid_stock()).unwrap();
        assert_relative_eq!(rater.rate(&doc), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345678), 12.35);
        assert_eq!(round2(-3.14159), -3.14);
    }
}
