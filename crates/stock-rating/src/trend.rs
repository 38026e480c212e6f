//! Quarter-over-quarter trend scoring.

use analysis_core::try_to_float;
use serde_json::{Map, Value};

pub const STEP: f64 = 5.0;

/// Average direction of every metric across consecutive quarterly snapshots.
///
/// Each quarter maps to snapshots in order. Every metric present in a
/// snapshot and the one before it counts as a comparison worth `+5` when it
/// rose, `-5` when it fell and 0 when flat or unreadable. Returns 0.0 when
/// nothing could be compared.
pub fn analyze_trend(quarterly_results: &Value) -> f64 {
    let Some(quarters) = quarterly_results.as_object() else {
        return 0.0;
    };

    let mut total = 0.0;
    let mut comparisons = 0usize;

    for snapshots in quarters.values().filter_map(Value::as_array) {
        let mut previous: Option<&Map<String, Value>> = None;
        for snapshot in snapshots.iter().filter_map(Value::as_object) {
            if let Some(prev) = previous {
                for (metric, current) in snapshot {
                    if let Some(before) = prev.get(metric) {
                        total += direction(before, current);
                        comparisons += 1;
                    }
                }
            }
            previous = Some(snapshot);
        }
    }

    if comparisons == 0 {
        return 0.0;
    }
    total / comparisons as f64
}

fn direction(before: &Value, current: &Value) -> f64 {
    match (metric_value(before), metric_value(current)) {
        (Some(b), Some(c)) if c > b => STEP,
        (Some(b), Some(c)) if c < b => -STEP,
        _ => 0.0,
    }
}

fn metric_value(value: &Value) -> Option<f64> {
    let s = value.as_str()?;
    match try_to_float(s) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!("Trend metric skipped: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_increasing_trend() {
        let data = json!({
            "Q1": [{"sales": "1000", "profit": "100"}, {"sales": "1100", "profit": "110"}],
            "Q2": [{"sales": "1200", "profit": "120"}, {"sales": "1300", "profit": "130"}]
        });
        assert_relative_eq!(analyze_trend(&data), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mixed_trend() {
        let data = json!({
            "Q1": [{"sales": "1000", "profit": "100"}, {"sales": "1100", "profit": "110"}],
            "Q2": [{"sales": "1200", "profit": "120"}, {"sales": "1300", "profit": "80"}]
        });
        assert_relative_eq!(analyze_trend(&data), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_decreasing_trend() {
        let data = json!({
            "Q1": [{"sales": "1,100"}, {"sales": "1,000"}],
            "Q2": [{"sales": "12%"}, {"sales": "8%"}]
        });
        assert!(analyze_trend(&data) < 0.0);
    }

    #[test]
    fn test_flat_and_unreadable_values_still_count() {
        let data = json!({
            "Q1": [{"sales": "100", "profit": "n/a"}, {"sales": "100", "profit": "20"}],
            "Q2": [{"sales": "100"}, {"sales": "200", "margin": "5"}]
        });
        // Three comparisons: flat, unreadable, +5.
        assert_relative_eq!(analyze_trend(&data), 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_object_snapshots_are_skipped() {
        let data = json!({
            "Q1": [{"sales": "100"}, "garbage", {"sales": "150"}]
        });
        assert_relative_eq!(analyze_trend(&data), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nothing_to_compare() {
        assert_eq!(analyze_trend(&json!({})), 0.0);
        assert_eq!(analyze_trend(&Value::Null), 0.0);
        assert_eq!(analyze_trend(&json!({"Q1": [{"sales": "1"}]})), 0.0);
        assert_eq!(analyze_trend(&json!({"Q1": "not a list"})), 0.0);
    }
}
