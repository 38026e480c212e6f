//! Overlap calculations between two fund portfolios.

use std::collections::{HashMap, HashSet};

use crate::models::{Instrument, MutualFund, OverlapReport};

/// Parse a printed weight such as `" 1,234.5% "`. Unreadable weights count as 0.
pub fn parse_percentage(raw: &str) -> f64 {
    let cleaned = raw.replace(['%', ','], "");
    cleaned.trim().parse::<f64>().unwrap_or_else(|_| {
        tracing::debug!("Unreadable holding weight {:?}", raw);
        0.0
    })
}

/// Sum of each fund's own weights over the ISINs both funds hold.
///
/// A fund listing one ISIN twice contributes its last entry.
pub fn weighted_overlap(fund1: &MutualFund, fund2: &MutualFund) -> (f64, f64) {
    let holdings1 = by_isin(fund1);
    let holdings2 = by_isin(fund2);

    let mut weight1 = 0.0;
    let mut weight2 = 0.0;
    for (isin, holding1) in &holdings1 {
        if let Some(holding2) = holdings2.get(isin) {
            weight1 += parse_percentage(&holding1.percentage);
            weight2 += parse_percentage(&holding2.percentage);
        }
    }

    (weight1, weight2)
}

fn by_isin(fund: &MutualFund) -> HashMap<String, &Instrument> {
    fund.instruments
        .iter()
        .map(|instrument| (instrument.isin_key(), instrument))
        .collect()
}

/// Shared holdings as a percentage of each fund's holding count.
///
/// Returns the second fund's instruments whose ISIN the first fund also holds.
pub fn overlap_percentage(fund1: &MutualFund, fund2: &MutualFund) -> (f64, f64, Vec<Instrument>) {
    let isins1: HashSet<String> = fund1.instruments.iter().map(Instrument::isin_key).collect();

    let common: Vec<Instrument> = fund2
        .instruments
        .iter()
        .filter(|instrument| isins1.contains(&instrument.isin_key()))
        .cloned()
        .collect();

    let share = |total: usize| {
        if total == 0 {
            0.0
        } else {
            common.len() as f64 / total as f64 * 100.0
        }
    };
    let pct1 = share(fund1.instruments.len());
    let pct2 = share(fund2.instruments.len());

    (pct1, pct2, common)
}

pub fn compare_funds(fund1: &MutualFund, fund2: &MutualFund) -> OverlapReport {
    let (weight1, weight2) = weighted_overlap(fund1, fund2);
    let (pct1, pct2, common_stocks) = overlap_percentage(fund1, fund2);

    tracing::info!(
        "Overlap {} vs {}: {} common holdings",
        fund1.name,
        fund2.name,
        common_stocks.len()
    );

    OverlapReport {
        fund1_percentage: format!("{:.2}", pct1),
        fund2_percentage: format!("{:.2}", pct2),
        fund1_percentage_weight: format!("{:.2}", weight1),
        fund2_percentage_weight: format!("{:.2}", weight2),
        common_stocks,
    }
}
