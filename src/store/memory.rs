//! In-memory gateway used by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::gateway::{Collection, GatewayError, Predicate, RemoteGateway};

#[derive(Default)]
pub struct MemoryGateway {
    rows: Mutex<HashMap<Collection, Vec<Value>>>,
    failing: Mutex<bool>,
    failing_counts: Mutex<Option<Collection>>,
    fetches: AtomicUsize,
    counts: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(collection: Collection, rows: Vec<Value>) -> Self {
        let gateway = Self::new();
        gateway.set_rows(collection, rows);
        gateway
    }

    pub fn set_rows(&self, collection: Collection, rows: Vec<Value>) {
        self.rows.lock().insert(collection, rows);
    }

    /// Make every subsequent call fail until reset
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Make only count queries against one collection fail
    pub fn fail_counts_on(&self, collection: Option<Collection>) {
        *self.failing_counts.lock() = collection;
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), GatewayError> {
        if *self.failing.lock() {
            return Err(GatewayError::Api {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Exact string equality, like PostgREST `eq` on a text column
fn matches(predicate: &Predicate, row: &Value) -> bool {
    row.get(predicate.field).and_then(Value::as_str) == Some(predicate.value)
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, GatewayError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.rows.lock().get(&collection).cloned().unwrap_or_default())
    }

    async fn count(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> Result<u64, GatewayError> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if *self.failing_counts.lock() == Some(collection) {
            return Err(GatewayError::Api {
                status: 500,
                body: format!("count on {} failed", collection),
            });
        }
        let rows = self.rows.lock();
        let matching = rows
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| predicates.iter().all(|p| matches(p, row)))
                    .count()
            })
            .unwrap_or(0);
        Ok(matching as u64)
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, GatewayError> {
        self.check()?;
        self.rows
            .lock()
            .entry(collection)
            .or_default()
            .push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn predicate_matching_is_exact() {
        let p = Predicate::eq("type", "lost");
        assert!(matches(&p, &json!({"type": "lost"})));
        assert!(!matches(&p, &json!({"type": "Lost"})));
        assert!(!matches(&p, &json!({"status": "lost"})));
    }
}
