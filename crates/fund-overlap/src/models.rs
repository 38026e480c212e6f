//! Fund Overlap Data Models

use serde::{Deserialize, Serialize};

/// One portfolio holding as parsed from a fund factsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub isin: String,
    /// Share of net assets, as printed (e.g. `"4.25%"`).
    pub percentage: String,
}

impl Instrument {
    pub fn new(
        name: impl Into<String>,
        isin: impl Into<String>,
        percentage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            isin: isin.into(),
            percentage: percentage.into(),
        }
    }

    /// ISINs compare case-insensitively.
    pub fn isin_key(&self) -> String {
        self.isin.to_uppercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutualFund {
    pub name: String,
    pub instruments: Vec<Instrument>,
}

/// Overlap figures formatted to two decimals, plus the shared holdings as
/// listed by the second fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapReport {
    pub fund1_percentage: String,
    pub fund2_percentage: String,
    pub fund1_percentage_weight: String,
    pub fund2_percentage_weight: String,
    pub common_stocks: Vec<Instrument>,
}
