//! Tolerant numeric coercion for scraped financial cells.
//!
//! Two policies live here. [`to_float`] never fails: a malformed cell is logged
//! and read as 0.0 so one bad value cannot abort a whole score. [`parse_price`]
//! is the strict variant used by the valuation path, where "unavailable" and
//! "zero" have to stay distinguishable.

use serde_json::Value;

use crate::AnalysisError;

/// Convert a document cell to `f64`.
///
/// Only strings are accepted. Thousands separators are stripped and a `%`
/// suffix divides by 100. Anything else yields 0.0.
pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::String(s) => str_to_float(s),
        other => {
            tracing::error!(
                "Error converting to float64: value is not a string ({})",
                value_kind(other)
            );
            0.0
        }
    }
}

/// String form of [`to_float`].
pub fn str_to_float(s: &str) -> f64 {
    match try_to_float(s) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Error converting to float64: {}", e);
            0.0
        }
    }
}

/// Fallible form of [`to_float`], for checks that must be skipped rather than
/// scored against 0.0 when a cell is malformed.
pub fn try_to_float(s: &str) -> Result<f64, AnalysisError> {
    let cleaned = s.replace(',', "");
    if cleaned.is_empty() {
        return Err(AnalysisError::InvalidNumber(s.to_string()));
    }

    if cleaned.contains('%') {
        return cleaned
            .replace('%', "")
            .parse::<f64>()
            .map(|v| v / 100.0)
            .map_err(|_| AnalysisError::InvalidNumber(s.to_string()));
    }

    cleaned
        .parse::<f64>()
        .map_err(|_| AnalysisError::InvalidNumber(s.to_string()))
}

/// Parse a headline figure such as `"₹ 1,234 Cr."`, `"22.5 %"` or `"1,200 - 1,500"`.
///
/// Currency glyphs, separators, whitespace and the `Cr`/`L` unit suffixes are
/// removed. A range of exactly two bounds resolves to its midpoint.
pub fn parse_price(raw: &str) -> Result<f64, AnalysisError> {
    let mut cleaned = raw.to_string();
    for token in ["₹", ",", " ", "Cr", "L", "%"] {
        cleaned = cleaned.replace(token, "");
    }

    if let Some((low, high)) = cleaned.split_once('-') {
        if !high.contains('-') {
            if let (Ok(low), Ok(high)) = (low.parse::<f64>(), high.parse::<f64>()) {
                return Ok((low + high) / 2.0);
            }
        }
    }

    cleaned
        .parse::<f64>()
        .map_err(|_| AnalysisError::InvalidNumber(raw.to_string()))
}

/// Peer-table coercion: plain decimal strings and JSON numbers, nothing else.
///
/// No separator stripping happens here, so `"8,000"` reads as 0.0.
pub fn parse_float(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse::<f64>().unwrap_or(0.0),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_to_float_strips_thousands_separators() {
        assert_eq!(to_float(&json!("1,234.5")), 1234.5);
        assert_eq!(to_float(&json!("12,34,567")), to_float(&json!("1234567")));
    }

    #[test]
    fn test_to_float_percentage() {
        assert_relative_eq!(to_float(&json!("12.34%")), 0.1234, epsilon = 1e-12);
        assert_relative_eq!(to_float(&json!("-19%")), -0.19, epsilon = 1e-12);
    }

    #[test]
    fn test_to_float_failures_are_zero() {
        assert_eq!(to_float(&json!("abc")), 0.0);
        assert_eq!(to_float(&json!("")), 0.0);
        assert_eq!(to_float(&json!(",,,")), 0.0);
        assert_eq!(to_float(&json!(42)), 0.0);
        assert_eq!(to_float(&Value::Null), 0.0);
    }

    #[test]
    fn test_try_to_float_reports_errors() {
        assert!(try_to_float("").is_err());
        assert!(try_to_float("n/a").is_err());
        assert_eq!(try_to_float("1,464").unwrap(), 1464.0);
    }

    #[test]
    fn test_parse_price_strips_currency_and_units() {
        assert_eq!(parse_price("₹ 1,234").unwrap(), 1234.0);
        assert_eq!(parse_price("20,000 Cr.").unwrap(), 20000.0);
        assert_eq!(parse_price("22.5 %").unwrap(), 22.5);
        assert_eq!(parse_price("15 L").unwrap(), 15.0);
    }

    #[test]
    fn test_parse_price_range_midpoint() {
        assert_eq!(parse_price("1,200 - 1,500").unwrap(), 1350.0);
        assert_eq!(parse_price("-5").unwrap(), -5.0);
    }

    #[test]
    fn test_parse_price_error() {
        assert_eq!(
            parse_price("n/a"),
            Err(AnalysisError::InvalidNumber("n/a".to_string()))
        );
        assert!(parse_price("").is_err());
        assert!(parse_price("1-2-3").is_err());
    }

    #[test]
    fn test_parse_float_variants() {
        assert_eq!(parse_float(&json!("42.57")), 42.57);
        assert_eq!(parse_float(&json!(17.5)), 17.5);
        assert_eq!(parse_float(&json!(3)), 3.0);
        assert_eq!(parse_float(&json!("2.0%")), 0.0);
        assert_eq!(parse_float(&json!("8,000")), 0.0);
        assert_eq!(parse_float(&json!(true)), 0.0);
    }
}
