//! Piotroski-style F-Score over scraped annual statements.
//!
//! Nine checks in three groups. A group whose series are missing, mistyped or
//! too short is unavailable, and that makes the whole score unavailable: a
//! partial sum would read as a weak company rather than an unknown one.

use analysis_core::{
    str_to_float, try_to_float, AnalysisError, FinancialDocument, FinancialSeries, QualityScore,
    BALANCE_SHEET, CASH_FLOWS, PROFIT_LOSS,
};

const NET_PROFIT: &[&str] = &[PROFIT_LOSS, "Net Profit +"];
const OPERATING_MARGIN: &[&str] = &[PROFIT_LOSS, "OPM %"];
const SALES: &[&str] = &[PROFIT_LOSS, "Sales +"];
const REVENUE: &[&str] = &[PROFIT_LOSS, "Revenue"];
const TOTAL_ASSETS: &[&str] = &[BALANCE_SHEET, "Total Assets"];
const BORROWINGS: &[&str] = &[BALANCE_SHEET, "Borrowings +"];
const OTHER_ASSETS: &[&str] = &[BALANCE_SHEET, "Other Assets +"];
const OTHER_LIABILITIES: &[&str] = &[BALANCE_SHEET, "Other Liabilities +"];
const EQUITY_CAPITAL: &[&str] = &[BALANCE_SHEET, "Equity Capital"];
const CASH_FROM_OPERATIONS: &[&str] = &[CASH_FLOWS, "Cash from Operating Activity +"];

pub const MAX_PROFITABILITY: u8 = 4;
pub const MAX_LEVERAGE: u8 = 3;
pub const MAX_OPERATING_EFFICIENCY: u8 = 2;

/// Compute the F-Score, or [`QualityScore::Unavailable`] when any group cannot be scored.
pub fn compute_f_score(doc: &FinancialDocument) -> QualityScore {
    match try_f_score(doc) {
        Ok(score) => QualityScore::Score(score),
        Err(e) => {
            tracing::warn!("F-Score not available: {}", e);
            QualityScore::Unavailable
        }
    }
}

fn try_f_score(doc: &FinancialDocument) -> Result<u8, AnalysisError> {
    let profitability = profitability_score(doc)?;
    let leverage = leverage_score(doc)?;
    let efficiency = operating_efficiency_score(doc)?;
    Ok(profitability + leverage + efficiency)
}

/// Return on assets, current and trend, plus cash-flow quality. Max 4.
pub fn profitability_score(doc: &FinancialDocument) -> Result<u8, AnalysisError> {
    let net_profit = doc.series(NET_PROFIT)?.require(3)?;
    let total_assets = doc.series(TOTAL_ASSETS)?.require(2)?;
    let cash_from_ops = doc.series(CASH_FROM_OPERATIONS)?.require(2)?;

    let mut score = 0;

    let current_roa = return_on_assets(
        cell(&net_profit, net_profit.latest_full_year()),
        cell(&total_assets, total_assets.latest()),
    );
    if current_roa > 0.0 {
        score += 1;
    }

    if let (Some(current), Some(previous)) = (
        strict(cash_from_ops.latest()),
        strict(cash_from_ops.prior()),
    ) {
        if current > previous {
            score += 1;
        }
    }

    let previous_roa = return_on_assets(
        cell(&net_profit, net_profit.prior_full_year()),
        cell(&total_assets, total_assets.prior()),
    );
    if current_roa > previous_roa {
        score += 1;
    }

    // Accruals: operating cash should exceed reported profit.
    if let (Some(cash), Some(profit)) = (
        strict(cash_from_ops.latest()),
        strict(net_profit.latest_full_year()),
    ) {
        if cash > profit {
            score += 1;
        }
    }

    Ok(score)
}

/// Debt load, liquidity and dilution. Max 3.
pub fn leverage_score(doc: &FinancialDocument) -> Result<u8, AnalysisError> {
    let borrowings = doc.series(BORROWINGS)?.require(2)?;
    let total_assets = doc.series(TOTAL_ASSETS)?.require(2)?;
    let other_assets = doc.series(OTHER_ASSETS)?.require(2)?;
    let other_liabilities = doc.series(OTHER_LIABILITIES)?.require(2)?;
    let equity_capital = doc.series(EQUITY_CAPITAL)?.require(2)?;

    let mut score = 0;

    let debt_ratio = ratio(
        cell(&borrowings, borrowings.latest()),
        cell(&total_assets, total_assets.latest()),
    );
    let previous_debt_ratio = ratio(
        cell(&borrowings, borrowings.prior()),
        cell(&total_assets, total_assets.prior()),
    );
    if debt_ratio <= previous_debt_ratio {
        score += 1;
    }

    let current_ratio = ratio(
        cell(&other_assets, other_assets.latest()),
        cell(&other_liabilities, other_liabilities.latest()),
    );
    let previous_current_ratio = ratio(
        cell(&other_assets, other_assets.prior()),
        cell(&other_liabilities, other_liabilities.prior()),
    );
    if current_ratio > previous_current_ratio {
        score += 1;
    }

    // Equity capital standing still is the proxy for no new share issuance.
    let equity = str_to_float(cell(&equity_capital, equity_capital.latest()));
    let previous_equity = str_to_float(cell(&equity_capital, equity_capital.prior()));
    if equity <= previous_equity {
        score += 1;
    }

    Ok(score)
}

/// Margin and asset-turnover improvement, TTM excluded. Max 2.
///
/// Banks publish no operating margin or sales line, so those fall back to
/// net margin and revenue.
pub fn operating_efficiency_score(doc: &FinancialDocument) -> Result<u8, AnalysisError> {
    let mut score = 0;

    if margin_improved(doc)? {
        score += 1;
    }

    let sales = match doc.series(SALES) {
        Ok(sales) => sales,
        Err(_) => doc.series(REVENUE)?,
    }
    .require(3)?;
    let total_assets = doc.series(TOTAL_ASSETS)?.require(2)?;

    let turnover = ratio(
        cell(&sales, sales.latest_full_year()),
        cell(&total_assets, total_assets.latest()),
    );
    let previous_turnover = ratio(
        cell(&sales, sales.prior_full_year()),
        cell(&total_assets, total_assets.prior()),
    );
    if turnover > previous_turnover {
        score += 1;
    }

    Ok(score)
}

fn margin_improved(doc: &FinancialDocument) -> Result<bool, AnalysisError> {
    if let Ok(opm) = doc.series(OPERATING_MARGIN) {
        // A short margin series scores nothing; net margin only stands in when it is absent.
        if opm.len() < 3 {
            return Ok(false);
        }
        let current = str_to_float(cell(&opm, opm.latest_full_year()));
        let previous = str_to_float(cell(&opm, opm.prior_full_year()));
        return Ok(current > previous);
    }

    let net_profit = doc.series(NET_PROFIT)?.require(3)?;
    let revenue = doc.series(REVENUE)?.require(3)?;
    let current = ratio(
        cell(&net_profit, net_profit.latest_full_year()),
        cell(&revenue, revenue.latest_full_year()),
    );
    let previous = ratio(
        cell(&net_profit, net_profit.prior_full_year()),
        cell(&revenue, revenue.prior_full_year()),
    );
    Ok(current > previous)
}

fn return_on_assets(net_profit: &str, total_assets: &str) -> f64 {
    ratio(net_profit, total_assets)
}

fn ratio(numerator: &str, denominator: &str) -> f64 {
    str_to_float(numerator) / str_to_float(denominator)
}

fn cell<'a>(series: &'a FinancialSeries, value: Option<&'a str>) -> &'a str {
    match value {
        Some(v) => v,
        None => {
            tracing::warn!("{} is shorter than its checked length", series.name);
            ""
        }
    }
}

fn strict(value: Option<&str>) -> Option<f64> {
    let value = value?;
    match try_to_float(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::error!("Skipping check on malformed cell: {}", e);
            None
        }
    }
}
