//! Target-price pipeline: DCF, relative and scenario models blended into one
//! target, nudged by a bounded quality overlay, then classified.
//!
//! Missing inputs degrade to fixed fallbacks so a valuation is always produced.

use analysis_core::{
    parse_price, FinancialDocument, MarketAssumptions, Recommendation, ValuationResult,
    BALANCE_SHEET,
};

/// One crore in base currency units. Headline figures are quoted in crore.
pub const CRORE: f64 = 10_000_000.0;

const BORROWINGS: &[&str] = &[BALANCE_SHEET, "Borrowings +"];

/// Growth and discount pair for one DCF run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthCase {
    pub growth_rate: f64,
    pub discount_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationAssumptions {
    pub base: GrowthCase,
    pub terminal_growth: f64,
    pub projection_years: i32,

    pub bull: GrowthCase,
    pub bear: GrowthCase,
    pub scenario_terminal_growth: f64,
    pub bull_weight: f64,
    pub base_weight: f64,
    pub bear_weight: f64,

    pub industry_pe: f64,

    pub dcf_weight: f64,
    pub relative_weight: f64,
    pub scenario_weight: f64,

    /// Revenue estimated as this fraction of market cap.
    pub revenue_to_market_cap: f64,
    pub fallback_net_margin: f64,
    pub ebitda_to_net_profit: f64,
    pub fcf_to_ebitda: f64,
    pub fallback_debt_to_revenue: f64,
    pub capex_to_revenue: f64,

    pub max_overlay: f64,
    pub max_upside: f64,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            base: GrowthCase {
                growth_rate: 0.08,
                discount_rate: 0.15,
            },
            terminal_growth: 0.03,
            projection_years: 5,
            bull: GrowthCase {
                growth_rate: 0.10,
                discount_rate: 0.13,
            },
            bear: GrowthCase {
                growth_rate: 0.05,
                discount_rate: 0.18,
            },
            scenario_terminal_growth: 0.04,
            bull_weight: 0.25,
            base_weight: 0.5,
            bear_weight: 0.25,
            industry_pe: 18.0,
            dcf_weight: 0.4,
            relative_weight: 0.4,
            scenario_weight: 0.2,
            revenue_to_market_cap: 0.25,
            fallback_net_margin: 0.10,
            ebitda_to_net_profit: 1.2,
            fcf_to_ebitda: 0.8,
            fallback_debt_to_revenue: 0.25,
            capex_to_revenue: 0.03,
            max_overlay: 0.10,
            max_upside: 40.0,
            buy_threshold: 20.0,
            sell_threshold: -20.0,
        }
    }
}

/// Company figures after extraction and fallback estimation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyInputs {
    pub revenue: f64,
    pub current_price: f64,
    pub net_profit: f64,
    pub ebitda: f64,
    pub free_cash_flow: f64,
    pub debt: f64,
    pub capex: f64,
}

/// Present value of `fcf` grown for `years` plus a Gordon terminal value.
pub fn discounted_cash_flow(
    fcf: f64,
    growth_rate: f64,
    discount_rate: f64,
    terminal_growth: f64,
    years: i32,
) -> f64 {
    let mut total = 0.0;
    for year in 1..=years {
        total += fcf * (1.0 + growth_rate).powi(year) / (1.0 + discount_rate).powi(year);
    }

    let final_fcf = fcf * (1.0 + growth_rate).powi(years);
    let terminal_value = final_fcf * (1.0 + terminal_growth) / (discount_rate - terminal_growth);
    total + terminal_value / (1.0 + discount_rate).powi(years)
}

pub struct ValuationEngine {
    assumptions: ValuationAssumptions,
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self::with_assumptions(ValuationAssumptions::default())
    }

    pub fn with_assumptions(assumptions: ValuationAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &ValuationAssumptions {
        &self.assumptions
    }

    pub fn value(&self, doc: &FinancialDocument) -> ValuationResult {
        let inputs = self.extract_inputs(doc);

        let dcf_value = self.dcf_value(
            &inputs,
            self.assumptions.base,
            self.assumptions.terminal_growth,
        );
        let relative_value = self.relative_value(&inputs);
        let scenario_value = self.scenario_value(&inputs, dcf_value);

        let a = &self.assumptions;
        let blended = a.dcf_weight * dcf_value
            + a.relative_weight * relative_value
            + a.scenario_weight * scenario_value;
        let overlay = self.risk_overlay(doc);
        let (target_price, upside_downside) =
            self.clamp_upside(blended * (1.0 + overlay), inputs.current_price);
        let recommendation = self.recommend(upside_downside);

        tracing::debug!(
            "Valuation {}: dcf={:.2} relative={:.2} scenario={:.2} overlay={:.3} target={:.2} upside={:.2}",
            doc.name().unwrap_or("<unnamed>"),
            dcf_value,
            relative_value,
            scenario_value,
            overlay,
            target_price,
            upside_downside
        );

        ValuationResult {
            revenue: inputs.revenue,
            ebitda: inputs.ebitda,
            net_profit: inputs.net_profit,
            free_cash_flow: inputs.free_cash_flow,
            debt: inputs.debt,
            capex: inputs.capex,
            current_price: inputs.current_price,
            assumptions: MarketAssumptions::default(),
            dcf_value,
            relative_value,
            scenario_value,
            target_price,
            upside_downside,
            recommendation,
        }
    }

    /// Read headline figures and fill gaps with ratio-based estimates.
    pub fn extract_inputs(&self, doc: &FinancialDocument) -> CompanyInputs {
        let a = &self.assumptions;
        let mut inputs = CompanyInputs::default();

        if let Some(market_cap) = headline(doc, "Market Cap") {
            inputs.revenue = market_cap * CRORE * a.revenue_to_market_cap;
        }
        if let Some(price) = headline(doc, "Current Price") {
            inputs.current_price = price;
        }

        if let Some(pe) = headline(doc, "Stock P/E").filter(|pe| *pe > 0.0) {
            if inputs.current_price > 0.0 && inputs.revenue > 0.0 {
                let eps = inputs.current_price / pe;
                let estimated_shares = inputs.revenue / (inputs.current_price * 0.1);
                inputs.net_profit = eps * estimated_shares;
            }
        }
        if inputs.net_profit <= 0.0 && inputs.revenue > 0.0 {
            inputs.net_profit = inputs.revenue * a.fallback_net_margin;
        }

        let roe_known = headline(doc, "ROE").is_some();
        if roe_known || inputs.net_profit > 0.0 {
            inputs.ebitda = inputs.net_profit * a.ebitda_to_net_profit;
        }
        if inputs.ebitda > 0.0 {
            inputs.free_cash_flow = inputs.ebitda * a.fcf_to_ebitda;
        }

        if let Some(borrowings) = latest_borrowings(doc) {
            inputs.debt = borrowings * CRORE;
        }
        if inputs.debt <= 0.0 && inputs.revenue > 0.0 {
            inputs.debt = inputs.revenue * a.fallback_debt_to_revenue;
        }

        if inputs.revenue > 0.0 {
            inputs.capex = inputs.revenue * a.capex_to_revenue;
        }

        inputs
    }

    /// Share count implied by market cap and price, or a revenue-based guess without a price.
    pub fn shares_outstanding(&self, inputs: &CompanyInputs) -> f64 {
        if inputs.current_price > 0.0 {
            (inputs.revenue / self.assumptions.revenue_to_market_cap) / inputs.current_price
        } else {
            inputs.revenue * 0.1
        }
    }

    pub fn dcf_value(&self, inputs: &CompanyInputs, case: GrowthCase, terminal_growth: f64) -> f64 {
        if inputs.free_cash_flow <= 0.0 {
            return 0.0;
        }
        let shares = self.shares_outstanding(inputs);
        if shares <= 0.0 {
            return 0.0;
        }

        discounted_cash_flow(
            inputs.free_cash_flow,
            case.growth_rate,
            case.discount_rate,
            terminal_growth,
            self.assumptions.projection_years,
        ) / shares
    }

    pub fn relative_value(&self, inputs: &CompanyInputs) -> f64 {
        if inputs.net_profit <= 0.0 {
            return 0.0;
        }
        let shares = self.shares_outstanding(inputs);
        if shares <= 0.0 {
            return 0.0;
        }
        inputs.net_profit * self.assumptions.industry_pe / shares
    }

    pub fn scenario_value(&self, inputs: &CompanyInputs, base_value: f64) -> f64 {
        let a = &self.assumptions;
        let bull = self.dcf_value(inputs, a.bull, a.scenario_terminal_growth);
        let bear = self.dcf_value(inputs, a.bear, a.scenario_terminal_growth);
        a.bull_weight * bull + a.base_weight * base_value + a.bear_weight * bear
    }

    /// Fractional target adjustment from return and yield quality, clamped to `±max_overlay`.
    pub fn risk_overlay(&self, doc: &FinancialDocument) -> f64 {
        let mut overlay: f64 = 0.0;

        if let Some(roe) = headline(doc, "ROE") {
            if roe > 20.0 {
                overlay += 0.05;
            } else if roe < 10.0 {
                overlay -= 0.05;
            }
        }
        if let Some(roce) = headline(doc, "ROCE") {
            if roce > 15.0 {
                overlay += 0.03;
            } else if roce < 8.0 {
                overlay -= 0.03;
            }
        }
        if let Some(dividend_yield) = headline(doc, "Dividend Yield") {
            if dividend_yield > 3.0 {
                overlay += 0.02;
            }
        }

        let max = self.assumptions.max_overlay;
        overlay.clamp(-max, max)
    }

    /// Returns `(target, upside %)`. With no price there is no upside and the target stands.
    pub fn clamp_upside(&self, target: f64, current_price: f64) -> (f64, f64) {
        if current_price <= 0.0 {
            return (target, 0.0);
        }

        let max = self.assumptions.max_upside;
        let upside = (target - current_price) / current_price * 100.0;
        if upside > max {
            (current_price * (1.0 + max / 100.0), max)
        } else if upside < -max {
            (current_price * (1.0 - max / 100.0), -max)
        } else {
            (target, upside)
        }
    }

    pub fn recommend(&self, upside_downside: f64) -> Recommendation {
        if upside_downside >= self.assumptions.buy_threshold {
            Recommendation::Buy
        } else if upside_downside <= self.assumptions.sell_threshold {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn headline(doc: &FinancialDocument, key: &str) -> Option<f64> {
    let raw = doc.text(key)?;
    match parse_price(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!("Ignoring {}: {}", key, e);
            None
        }
    }
}

fn latest_borrowings(doc: &FinancialDocument) -> Option<f64> {
    let series = doc.series(BORROWINGS).ok()?;
    parse_price(series.latest()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::{json, Value};

    fn doc(value: Value) -> FinancialDocument {
        FinancialDocument::try_from(value).unwrap()
    }

    #[test]
    fn test_discounted_cash_flow() {
        let value = discounted_cash_flow(100.0, 0.08, 0.15, 0.03, 5);
        assert_relative_eq!(value, 1042.8017, epsilon = 1e-3);
    }

    #[test]
    fn test_large_cap_valuation_caps_upside() {
        let engine = ValuationEngine::new();
        let d = doc(json!({
            "name": "Acme",
            "Market Cap": "₹ 20,000 Cr.",
            "Current Price": "₹ 500",
            "Stock P/E": "15",
            "ROE": "22 %"
        }));

        let inputs = engine.extract_inputs(&d);
        assert_relative_eq!(inputs.revenue, 5.0e10, max_relative = 1e-12);
        assert_relative_eq!(inputs.net_profit, 3.333_333_333_3e10, max_relative = 1e-9);
        assert_relative_eq!(inputs.ebitda, 4.0e10, max_relative = 1e-9);
        assert_relative_eq!(inputs.free_cash_flow, 3.2e10, max_relative = 1e-9);
        assert_relative_eq!(inputs.debt, 1.25e10, max_relative = 1e-12);
        assert_relative_eq!(inputs.capex, 1.5e9, max_relative = 1e-12);
        assert_relative_eq!(engine.shares_outstanding(&inputs), 4.0e8, max_relative = 1e-12);

        let result = engine.value(&d);
        assert_relative_eq!(result.dcf_value, 834.2414, epsilon = 1e-3);
        assert_relative_eq!(result.relative_value, 1500.0, epsilon = 1e-6);
        assert_relative_eq!(result.scenario_value, 865.7559, epsilon = 1e-3);
        assert_eq!(result.upside_downside, 40.0);
        assert_relative_eq!(result.target_price, 700.0, epsilon = 1e-9);
        assert_eq!(result.recommendation, Recommendation::Buy);
        assert_eq!(result.assumptions, MarketAssumptions::default());
    }

    #[test]
    fn test_missing_pe_uses_margin_fallback() {
        let engine = ValuationEngine::new();
        let d = doc(json!({"Market Cap": "1,000", "Current Price": "100"}));
        let inputs = engine.extract_inputs(&d);
        assert_relative_eq!(inputs.net_profit, inputs.revenue * 0.10, max_relative = 1e-12);
    }

    #[test]
    fn test_missing_price_gives_no_upside() {
        let engine = ValuationEngine::new();
        let d = doc(json!({"Market Cap": "1,000"}));
        let result = engine.value(&d);

        assert_eq!(result.current_price, 0.0);
        assert_eq!(result.upside_downside, 0.0);
        assert_eq!(result.recommendation, Recommendation::Hold);
        // Revenue-based share estimate: revenue * 0.1 shares.
        assert_relative_eq!(result.dcf_value, 10.0109, epsilon = 1e-3);
        assert_relative_eq!(result.relative_value, 18.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_document_degrades_to_zero() {
        let result = ValuationEngine::new().value(&FinancialDocument::default());
        assert_eq!(result.revenue, 0.0);
        assert_eq!(result.dcf_value, 0.0);
        assert_eq!(result.relative_value, 0.0);
        assert_eq!(result.scenario_value, 0.0);
        assert_eq!(result.target_price, 0.0);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_borrowings_read_from_balance_sheet() {
        let engine = ValuationEngine::new();
        let d = doc(json!({
            "Market Cap": "1,000",
            "balanceSheet": {"Borrowings\u{a0}+": ["1,464", "495"]}
        }));
        assert_relative_eq!(engine.extract_inputs(&d).debt, 495.0 * CRORE, max_relative = 1e-12);

        let zero_debt = doc(json!({
            "Market Cap": "1,000",
            "balanceSheet": {"Borrowings +": ["0"]}
        }));
        let inputs = engine.extract_inputs(&zero_debt);
        assert_relative_eq!(inputs.debt, inputs.revenue * 0.25, max_relative = 1e-12);
    }

    #[test]
    fn test_risk_overlay() {
        let engine = ValuationEngine::new();
        let strong = doc(json!({"ROE": "25", "ROCE": "20", "Dividend Yield": "4 %"}));
        assert_relative_eq!(engine.risk_overlay(&strong), 0.10, epsilon = 1e-12);

        let weak = doc(json!({"ROE": "5", "ROCE": "5"}));
        assert_relative_eq!(engine.risk_overlay(&weak), -0.08, epsilon = 1e-12);

        let unknown = doc(json!({"ROE": "n/a"}));
        assert_eq!(engine.risk_overlay(&unknown), 0.0);
    }

    #[test]
    fn test_risk_overlay_is_clamped() {
        let engine = ValuationEngine::with_assumptions(ValuationAssumptions {
            max_overlay: 0.04,
            ..ValuationAssumptions::default()
        });
        let strong = doc(json!({"ROE": "25", "ROCE": "20"}));
        assert_relative_eq!(engine.risk_overlay(&strong), 0.04, epsilon = 1e-12);
        let weak = doc(json!({"ROE": "5", "ROCE": "5"}));
        assert_relative_eq!(engine.risk_overlay(&weak), -0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_clamp_upside() {
        let engine = ValuationEngine::new();
        let (target, upside) = engine.clamp_upside(1000.0, 100.0);
        assert_relative_eq!(target, 140.0, epsilon = 1e-9);
        assert_eq!(upside, 40.0);
        let (target, upside) = engine.clamp_upside(10.0, 100.0);
        assert_relative_eq!(target, 60.0, epsilon = 1e-9);
        assert_eq!(upside, -40.0);
        let (target, upside) = engine.clamp_upside(110.0, 100.0);
        assert_eq!(target, 110.0);
        assert_relative_eq!(upside, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_recommendation_thresholds() {
        let engine = ValuationEngine::new();
        assert_eq!(engine.recommend(20.0), Recommendation::Buy);
        assert_eq!(engine.recommend(19.99), Recommendation::Hold);
        assert_eq!(engine.recommend(0.0), Recommendation::Hold);
        assert_eq!(engine.recommend(-20.0), Recommendation::Sell);
        assert_eq!(engine.recommend(-19.99), Recommendation::Hold);
    }

    #[test]
    fn test_loss_maker_zeroes_dcf_and_relative() {
        let engine = ValuationEngine::new();
        let inputs = CompanyInputs {
            revenue: 1.0e9,
            current_price: 10.0,
            net_profit: -5.0e7,
            free_cash_flow: -1.0,
            ..CompanyInputs::default()
        };
        assert_eq!(
            engine.dcf_value(&inputs, engine.assumptions().base, 0.03),
            0.0
        );
        assert_eq!(engine.relative_value(&inputs), 0.0);
    }
}
