//! Financial-statement document model and the nested series accessor.
//!
//! Scraped line items that expand on the source page end in `" +"`, and the
//! space before the plus is a non-breaking space in stored documents. Keys are
//! canonicalized once when a document is constructed, and every lookup path is
//! canonicalized the same way, so either spelling resolves.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AnalysisError;

pub const PROFIT_LOSS: &str = "profitLoss";
pub const BALANCE_SHEET: &str = "balanceSheet";
pub const CASH_FLOWS: &str = "cashFlows";
pub const RATIOS: &str = "ratios";
pub const SHAREHOLDING_PATTERN: &str = "shareholdingPattern";
pub const PEERS: &str = "peers";
pub const QUARTERLY_RESULTS: &str = "quarterlyResults";

/// Canonical spelling of a line-item key: trimmed, with `" +"` rewritten to `"\u{a0}+"`.
pub fn canonical_key(key: &str) -> String {
    let key = key.trim();
    if key.contains('+') {
        key.replace(" +", "\u{a0}+")
    } else {
        key.to_string()
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (canonical_key(&k), canonicalize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// A company record as produced by the scraper and kept in the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct FinancialDocument {
    fields: Map<String, Value>,
}

impl From<Map<String, Value>> for FinancialDocument {
    fn from(fields: Map<String, Value>) -> Self {
        match canonicalize(Value::Object(fields)) {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl From<FinancialDocument> for Map<String, Value> {
    fn from(doc: FinancialDocument) -> Self {
        doc.fields
    }
}

impl TryFrom<Value> for FinancialDocument {
    type Error = AnalysisError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into()),
            other => Err(AnalysisError::InvalidData(format!(
                "financial document must be an object, got {}",
                other
            ))),
        }
    }
}

impl FinancialDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(&canonical_key(key))
    }

    /// Top-level scalar field, when it is a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn peers(&self) -> &[Value] {
        self.get(PEERS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn quarterly_results(&self) -> Option<&Value> {
        self.get(QUARTERLY_RESULTS)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Walk `path` through nested sections and return the string series at its end.
    ///
    /// Intermediate segments must be objects and the final one an array, else
    /// [`AnalysisError::FieldNotFound`]. Mixed-type arrays are rejected with
    /// [`AnalysisError::InvalidElementType`] rather than coerced.
    pub fn series(&self, path: &[&str]) -> Result<FinancialSeries, AnalysisError> {
        let joined = path.join("/");
        let (last, sections) = path
            .split_last()
            .ok_or_else(|| AnalysisError::FieldNotFound(joined.clone()))?;

        let mut current = &self.fields;
        for segment in sections {
            current = current
                .get(&canonical_key(segment))
                .and_then(Value::as_object)
                .ok_or_else(|| AnalysisError::FieldNotFound(joined.clone()))?;
        }

        let items = current
            .get(&canonical_key(last))
            .and_then(Value::as_array)
            .ok_or_else(|| AnalysisError::FieldNotFound(joined.clone()))?;

        let values = items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| AnalysisError::InvalidElementType(joined.clone()))?;

        Ok(FinancialSeries::new(joined, values))
    }
}

/// One line item across reporting periods, oldest first.
///
/// Profit & loss and cash-flow rows often end with a trailing-twelve-months
/// column; the `*_full_year` accessors skip it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSeries {
    pub name: String,
    pub values: Vec<String>,
}

impl FinancialSeries {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `n`th value counting back from the end (1 = last).
    pub fn from_end(&self, n: usize) -> Option<&str> {
        if n == 0 || n > self.values.len() {
            return None;
        }
        self.values.get(self.values.len() - n).map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.from_end(1)
    }

    pub fn prior(&self) -> Option<&str> {
        self.from_end(2)
    }

    pub fn latest_full_year(&self) -> Option<&str> {
        self.from_end(2)
    }

    pub fn prior_full_year(&self) -> Option<&str> {
        self.from_end(3)
    }

    /// Fail with [`AnalysisError::InsufficientData`] when fewer than `min` points exist.
    pub fn require(self, min: usize) -> Result<Self, AnalysisError> {
        if self.values.len() < min {
            return Err(AnalysisError::InsufficientData(format!(
                "{} has {} values, need {}",
                self.name,
                self.values.len(),
                min
            )));
        }
        Ok(self)
    }
}
