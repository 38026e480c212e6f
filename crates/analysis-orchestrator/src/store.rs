//! In-memory document store keyed by document id.

use analysis_core::{
    AnalysisError, DocumentStore, FinancialDocument, RatingUpdate, StoredDocument,
    ValuationResult,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Map, Value};

pub struct InMemoryDocumentStore {
    documents: DashMap<String, Value>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Load a JSON array of documents. Ids come from `_id`, then `name`, then the array position.
    pub fn from_json_array(values: Vec<Value>) -> Self {
        let store = Self::new();
        for (index, value) in values.into_iter().enumerate() {
            let id = value
                .get("_id")
                .or_else(|| value.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| index.to_string());
            store.insert(id, value);
        }
        store
    }

    pub fn insert(&self, id: impl Into<String>, document: Value) {
        self.documents.insert(id.into(), document);
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.documents.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every document, sorted by id.
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        let mut all: Vec<(String, Value)> = self
            .documents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    fn merge(&self, id: &str, fields: Map<String, Value>) -> Result<(), AnalysisError> {
        let mut entry = self
            .documents
            .get_mut(id)
            .ok_or_else(|| AnalysisError::StoreError(format!("document {} not found", id)))?;
        let document = entry
            .value_mut()
            .as_object_mut()
            .ok_or_else(|| AnalysisError::StoreError(format!("document {} is not an object", id)))?;
        document.extend(fields);
        Ok(())
    }
}

fn to_fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_documents(&self) -> Result<Vec<StoredDocument>, AnalysisError> {
        let mut documents = Vec::with_capacity(self.documents.len());
        for (id, value) in self.snapshot() {
            match FinancialDocument::try_from(value) {
                Ok(document) => documents.push(StoredDocument { id, document }),
                Err(e) => tracing::warn!("Skipping stored document {}: {}", id, e),
            }
        }
        Ok(documents)
    }

    async fn save_rating(&self, id: &str, update: &RatingUpdate) -> Result<(), AnalysisError> {
        let fields = serde_json::to_value(update)
            .map_err(|e| AnalysisError::StoreError(e.to_string()))?;
        self.merge(id, to_fields(fields))
    }

    async fn save_valuation(
        &self,
        id: &str,
        valuation: &ValuationResult,
    ) -> Result<(), AnalysisError> {
        let fields = json!({
            "targetPrice": valuation.target_price,
            "recommendation": valuation.recommendation,
            "upsideDownside": valuation.upside_downside,
            "dcfValue": valuation.dcf_value,
            "relativeValue": valuation.relative_value,
            "scenarioValue": valuation.scenario_value,
            "valuationData": valuation,
        });
        self.merge(id, to_fields(fields))
    }
}
