//! Peer Comparison Module
//!
//! Scores a stock against its scraped peer table. The table's last row is the
//! sector median and is scored separately with lighter weights.

use serde_json::Value;

use crate::models::{PeerMetrics, StockProfile};

/// Points awarded per metric when the stock beats a row.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerWeights {
    /// Also the ceiling of the partial credit when the stock's P/E is not lower
    pub pe: f64,
    pub market_cap: f64,
    pub dividend_yield: f64,
    pub roce: f64,
    pub quarterly_sales: f64,
    pub quarterly_profit: f64,
}

impl PeerWeights {
    pub const PEER: PeerWeights = PeerWeights {
        pe: 10.0,
        market_cap: 5.0,
        dividend_yield: 5.0,
        roce: 10.0,
        quarterly_sales: 5.0,
        quarterly_profit: 10.0,
    };

    pub const MEDIAN: PeerWeights = PeerWeights {
        pe: 5.0,
        market_cap: 3.0,
        dividend_yield: 3.0,
        roce: 5.0,
        quarterly_sales: 2.0,
        quarterly_profit: 5.0,
    };
}

impl Default for PeerWeights {
    fn default() -> Self {
        Self::PEER
    }
}

/// Score `stock` against every row of `peers`.
///
/// Returns 0.0 with fewer than two rows, since a lone row is only the median.
pub fn compare_peers(stock: &StockProfile, peers: &[Value]) -> f64 {
    let Some((median_row, peer_rows)) = peers.split_last() else {
        tracing::warn!("Not enough peers to compare");
        return 0.0;
    };
    if peer_rows.is_empty() {
        tracing::warn!("Not enough peers to compare");
        return 0.0;
    }

    let peer_total: f64 = peer_rows
        .iter()
        .map(|row| match PeerMetrics::from_row(row) {
            Some(metrics) => score_against(stock, &metrics, &PeerWeights::PEER),
            None => {
                tracing::warn!("Peer row is not a table row, scoring it as empty");
                score_against(stock, &PeerMetrics::default(), &PeerWeights::PEER)
            }
        })
        .sum();

    // Without a readable median the raw peer total is returned, not an average.
    let Some(median) = PeerMetrics::from_row(median_row) else {
        tracing::warn!("Failed to parse median data");
        return peer_total;
    };
    let median_score = score_against(stock, &median, &PeerWeights::MEDIAN);

    combine_peer_and_median(peer_total, peer_rows.len(), median_score)
}

/// Peer points are averaged over the peer rows; median points are added as-is.
pub fn combine_peer_and_median(peer_total: f64, peer_count: usize, median_score: f64) -> f64 {
    peer_total / peer_count as f64 + median_score
}

/// Points the stock earns against one row.
pub fn score_against(stock: &StockProfile, row: &PeerMetrics, weights: &PeerWeights) -> f64 {
    let mut score = 0.0;

    if stock.pe < row.pe {
        score += weights.pe;
    } else {
        score += (weights.pe - (stock.pe - row.pe)).max(0.0);
    }

    if stock.market_cap > row.market_cap {
        score += weights.market_cap;
    }
    if stock.dividend_yield > row.dividend_yield {
        score += weights.dividend_yield;
    }
    if stock.roce > row.roce {
        score += weights.roce;
    }
    if stock.quarterly_sales > row.quarterly_sales {
        score += weights.quarterly_sales;
    }
    if stock.quarterly_profit > row.quarterly_profit {
        score += weights.quarterly_profit;
    }

    score
}
