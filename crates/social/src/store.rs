//! Document store contract.
//!
//! Writes are either whole-document puts or field increments. There is no
//! read path: generators only ever create records and bump denormalized
//! counters on their parents.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::StoreError;
use crate::models::Record;

/// Value of a single document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    /// Set to the write time by the store.
    ServerTimestamp,
}

/// A document body ready to be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from a record that serializes to a JSON object.
    pub fn from_record<T: Serialize + ?Sized>(record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(map) => Ok(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::Value(v)))
                    .collect(),
            }),
            _ => Err(StoreError::NotAnObject),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .insert(field.into(), FieldValue::Value(value.into()));
        self
    }

    /// Marks a field to be set to the write time.
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), FieldValue::ServerTimestamp);
        self
    }

    /// Plain values, without the server-timestamp fields.
    pub fn values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|(k, v)| match v {
                FieldValue::Value(value) => Some((k.clone(), value.clone())),
                FieldValue::ServerTimestamp => None,
            })
            .collect()
    }

    pub fn server_timestamp_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, v)| matches!(v, FieldValue::ServerTimestamp))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Resolves server timestamps to `now` and returns the full body.
    pub fn resolve(&self, now: &Value) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| match v {
                FieldValue::Value(value) => (k.clone(), value.clone()),
                FieldValue::ServerTimestamp => (k.clone(), now.clone()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Target id of a put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocKey {
    /// Let the store generate an id.
    Auto,
    Named(String),
}

impl DocKey {
    pub fn named(id: impl Into<String>) -> Self {
        DocKey::Named(id.into())
    }

    /// Returns the named id, or one produced by `generate` for `Auto`.
    pub fn resolve_with(self, generate: impl FnOnce() -> String) -> String {
        match self {
            DocKey::Auto => generate(),
            DocKey::Named(id) => id,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes a document, overwriting any existing one with the same id.
    ///
    /// Returns the id the document was stored under.
    async fn put(&self, collection: &str, key: DocKey, document: Document)
    -> Result<String, StoreError>;

    /// Adds `by` to an integer field of an existing document.
    ///
    /// A missing field counts from zero; a missing document is an error.
    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<(), StoreError>;
}

/// Writes a record into its own collection.
pub async fn put_record<R: Record + Sync>(
    store: &dyn DocumentStore,
    key: DocKey,
    record: &R,
) -> Result<String, StoreError> {
    let document = record.to_document()?;
    store.put(R::COLLECTION, key, document).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        count: u32,
    }

    #[test]
    fn test_from_record_and_resolve() {
        let doc = Document::from_record(&Sample {
            name: "circle",
            count: 2,
        })
        .unwrap()
        .server_timestamp("createdAt");

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.values().len(), 2);
        assert_eq!(doc.server_timestamp_fields(), ["createdAt"]);

        let body = doc.resolve(&json!("2024-01-01T00:00:00Z"));
        assert_eq!(body["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(body["count"], 2);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = Document::from_record(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject));
    }

    #[test]
    fn test_doc_key_resolution() {
        assert_eq!(DocKey::named("abc").resolve_with(|| "gen".into()), "abc");
        assert_eq!(DocKey::Auto.resolve_with(|| "gen".into()), "gen");
    }
}
