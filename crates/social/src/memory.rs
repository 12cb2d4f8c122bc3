//! In-process document store.
//!
//! Used for dry runs and tests. Supports injecting failures on the next N
//! puts or increments against a collection.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::store::{DocKey, Document, DocumentStore};

/// Store operation kinds, used for fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Put,
    Increment,
}

#[derive(Debug)]
struct Fault {
    op: StoreOp,
    collection: String,
    remaining: usize,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, BTreeMap<String, Map<String, Value>>>,
    faults: Vec<Fault>,
    puts: usize,
    increments: usize,
}

impl State {
    /// Consumes one pending fault matching the operation, if any.
    fn take_fault(&mut self, op: StoreOp, collection: &str) -> bool {
        let Some(fault) = self
            .faults
            .iter_mut()
            .find(|f| f.op == op && f.collection == collection && f.remaining > 0)
        else {
            return false;
        };
        fault.remaining -= 1;
        self.faults.retain(|f| f.remaining > 0);
        true
    }
}

/// Document store backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `times` operations of kind `op` on `collection` fail.
    pub fn fail_next(&self, op: StoreOp, collection: &str, times: usize) {
        self.state().faults.push(Fault {
            op,
            collection: collection.to_string(),
            remaining: times,
        });
    }

    /// Returns a stored document body.
    pub fn get(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        self.state()
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Returns all documents in a collection, ordered by id.
    pub fn documents(&self, collection: &str) -> Vec<(String, Map<String, Value>)> {
        self.state()
            .collections
            .get(collection)
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.state()
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Number of successful puts and increments so far.
    pub fn write_counts(&self) -> (usize, usize) {
        let state = self.state();
        (state.puts, state.increments)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(
        &self,
        collection: &str,
        key: DocKey,
        document: Document,
    ) -> Result<String, StoreError> {
        let now = Value::String(OffsetDateTime::now_utc().format(&Rfc3339)?);
        let mut state = self.state();

        if state.take_fault(StoreOp::Put, collection) {
            return Err(StoreError::Injected {
                op: StoreOp::Put,
                collection: collection.to_string(),
            });
        }

        let id = key.resolve_with(|| Uuid::new_v4().simple().to_string());
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document.resolve(&now));
        state.puts += 1;

        debug!(collection, id = %id, "stored document");
        Ok(id)
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<(), StoreError> {
        let mut state = self.state();

        if state.take_fault(StoreOp::Increment, collection) {
            return Err(StoreError::Injected {
                op: StoreOp::Increment,
                collection: collection.to_string(),
            });
        }

        let doc = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let current = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
        doc.insert(field.to_string(), Value::from(current + by));
        state.increments += 1;

        Ok(())
    }
}
