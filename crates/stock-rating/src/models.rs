//! Stock Rating Data Models

use analysis_core::{parse_float, to_float, FinancialDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The rated company's own headline metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockProfile {
    pub name: String,
    pub pe: f64,
    pub market_cap: f64,
    pub dividend_yield: f64,
    pub roce: f64,
    pub quarterly_sales: f64,
    pub quarterly_profit: f64,
}

impl StockProfile {
    /// Read the stored camelCase fields. Absent fields are 0.0.
    pub fn from_document(doc: &FinancialDocument) -> Self {
        let field = |key: &str| doc.get(key).map(to_float).unwrap_or(0.0);
        Self {
            name: doc.name().unwrap_or_default().to_string(),
            pe: field("stockPE"),
            market_cap: field("marketCap"),
            dividend_yield: field("dividendYield"),
            roce: field("roce"),
            quarterly_sales: field("quarterlySales"),
            quarterly_profit: field("quarterlyProfit"),
        }
    }
}

/// One row of the scraped peer table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerMetrics {
    pub pe: f64,
    pub market_cap: f64,
    pub dividend_yield: f64,
    pub roce: f64,
    pub quarterly_sales: f64,
    pub quarterly_profit: f64,
}

impl PeerMetrics {
    /// Missing or non-numeric cells read as 0.0; a row that is not an object is `None`.
    pub fn from_row(row: &Value) -> Option<Self> {
        let row = row.as_object()?;
        let cell = |key: &str| row.get(key).map(parse_float).unwrap_or(0.0);
        Some(Self {
            pe: cell("pe"),
            market_cap: cell("market_cap"),
            dividend_yield: cell("div_yield"),
            roce: cell("roce"),
            quarterly_sales: cell("sales_qtr"),
            quarterly_profit: cell("np_qtr"),
        })
    }
}
