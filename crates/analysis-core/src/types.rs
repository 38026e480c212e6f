use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Piotroski-style quality score.
///
/// Persisted and rendered as a plain integer where -1 means the score could
/// not be computed. Keep the tagged form in code so the sentinel never leaks
/// into arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityScore {
    Unavailable,
    Score(u8),
}

impl QualityScore {
    pub const SENTINEL: i32 = -1;

    pub fn to_sentinel(self) -> i32 {
        match self {
            QualityScore::Unavailable => Self::SENTINEL,
            QualityScore::Score(s) => i32::from(s),
        }
    }

    pub fn from_sentinel(value: i32) -> Self {
        match u8::try_from(value) {
            Ok(s) => QualityScore::Score(s),
            Err(_) => QualityScore::Unavailable,
        }
    }

    pub fn score(self) -> Option<u8> {
        match self {
            QualityScore::Unavailable => None,
            QualityScore::Score(s) => Some(s),
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, QualityScore::Score(_))
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityScore::Unavailable => f.write_str("Not Available"),
            QualityScore::Score(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for QualityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.to_sentinel())
    }
}

impl<'de> Deserialize<'de> for QualityScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from_sentinel)
    }
}

/// Final call derived from the clamped upside/downside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Macro and industry backdrop. Fixed constants, not read from the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAssumptions {
    pub gdp_growth: f64,
    pub inflation: f64,
    pub interest_rate: f64,
    pub industry_demand: f64,
    pub industry_supply: f64,
    pub industry_pricing: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            gdp_growth: 6.5,
            inflation: 4.0,
            interest_rate: 6.5,
            industry_demand: 12.0,
            industry_supply: 10.0,
            industry_pricing: 2.0,
        }
    }
}

/// Output of one valuation pass. Monetary inputs are in base currency units,
/// per-share values in price units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub revenue: f64,
    pub ebitda: f64,
    pub net_profit: f64,
    pub free_cash_flow: f64,
    pub debt: f64,
    pub capex: f64,
    pub current_price: f64,
    pub assumptions: MarketAssumptions,
    pub dcf_value: f64,
    pub relative_value: f64,
    pub scenario_value: f64,
    pub target_price: f64,
    pub upside_downside: f64,
    pub recommendation: Recommendation,
}

impl ValuationResult {
    pub fn summary(&self) -> String {
        format!(
            "Investment recommendation: {} with {:.2}% {}",
            self.recommendation,
            self.upside_downside.abs(),
            if self.upside_downside >= 0.0 { "upside" } else { "downside" }
        )
    }
}

/// Size bucket from a market cap quoted in crore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketCapCategory {
    #[serde(rename = "Large Cap")]
    LargeCap,
    #[serde(rename = "Mid Cap")]
    MidCap,
    #[serde(rename = "Small Cap")]
    SmallCap,
    #[serde(rename = "Unknown Category")]
    Unknown,
}

impl MarketCapCategory {
    pub const LARGE_CAP_FLOOR: f64 = 20_000.0;
    pub const MID_CAP_FLOOR: f64 = 5_000.0;

    /// Classify a raw market-cap cell. An unparseable value reads as 0; NaN is `Unknown`.
    pub fn from_market_cap(raw: &str) -> Self {
        let market_cap = match raw.replace(',', "").parse::<f64>() {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Failed to convert market cap {:?}: {}", raw, e);
                0.0
            }
        };
        Self::from_value(market_cap)
    }

    pub fn from_value(market_cap: f64) -> Self {
        if market_cap >= Self::LARGE_CAP_FLOOR {
            MarketCapCategory::LargeCap
        } else if market_cap >= Self::MID_CAP_FLOOR {
            MarketCapCategory::MidCap
        } else if market_cap < Self::MID_CAP_FLOOR {
            MarketCapCategory::SmallCap
        } else {
            MarketCapCategory::Unknown
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            MarketCapCategory::LargeCap => "Large Cap",
            MarketCapCategory::MidCap => "Mid Cap",
            MarketCapCategory::SmallCap => "Small Cap",
            MarketCapCategory::Unknown => "Unknown Category",
        }
    }
}

impl fmt::Display for MarketCapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quality_score_sentinel() {
        assert_eq!(QualityScore::Unavailable.to_sentinel(), -1);
        assert_eq!(QualityScore::Score(0).to_sentinel(), 0);
        assert_ne!(QualityScore::Unavailable, QualityScore::Score(0));
        assert_eq!(QualityScore::from_sentinel(-1), QualityScore::Unavailable);
        assert_eq!(QualityScore::from_sentinel(7), QualityScore::Score(7));
    }

    #[test]
    fn test_quality_score_rendering() {
        assert_eq!(QualityScore::Unavailable.to_string(), "Not Available");
        assert_eq!(QualityScore::Score(6).to_string(), "6");
        assert_eq!(serde_json::to_value(QualityScore::Unavailable).unwrap(), json!(-1));
        assert_eq!(serde_json::to_value(QualityScore::Score(3)).unwrap(), json!(3));
        let parsed: QualityScore = serde_json::from_value(json!(-1)).unwrap();
        assert_eq!(parsed, QualityScore::Unavailable);
    }

    #[test]
    fn test_recommendation_serialization() {
        assert_eq!(serde_json::to_value(Recommendation::Buy).unwrap(), json!("BUY"));
        assert_eq!(Recommendation::Sell.to_string(), "SELL");
    }

    #[test]
    fn test_market_cap_category_boundaries() {
        assert_eq!(MarketCapCategory::from_market_cap("20000"), MarketCapCategory::LargeCap);
        assert_eq!(MarketCapCategory::from_market_cap("19999"), MarketCapCategory::MidCap);
        assert_eq!(MarketCapCategory::from_market_cap("5000"), MarketCapCategory::MidCap);
        assert_eq!(MarketCapCategory::from_market_cap("4999.99"), MarketCapCategory::SmallCap);
        assert_eq!(MarketCapCategory::from_market_cap("1,50,000"), MarketCapCategory::LargeCap);
    }

    #[test]
    fn test_market_cap_category_bad_input() {
        assert_eq!(MarketCapCategory::from_market_cap("abc"), MarketCapCategory::SmallCap);
        assert_eq!(MarketCapCategory::from_market_cap("NaN"), MarketCapCategory::Unknown);
        assert_eq!(MarketCapCategory::Unknown.to_string(), "Unknown Category");
    }

    #[test]
    fn test_valuation_summary() {
        let result = ValuationResult {
            revenue: 0.0,
            ebitda: 0.0,
            net_profit: 0.0,
            free_cash_flow: 0.0,
            debt: 0.0,
            capex: 0.0,
            current_price: 100.0,
            assumptions: MarketAssumptions::default(),
            dcf_value: 0.0,
            relative_value: 0.0,
            scenario_value: 0.0,
            target_price: 75.0,
            upside_downside: -25.0,
            recommendation: Recommendation::Sell,
        };
        assert_eq!(result.summary(), "Investment recommendation: SELL with 25.00% downside");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["dcfValue"], json!(0.0));
        assert_eq!(json["upsideDownside"], json!(-25.0));
        assert_eq!(json["recommendation"], json!("SELL"));
    }
}
