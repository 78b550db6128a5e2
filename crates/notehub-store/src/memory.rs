//! In-memory document store.
//!
//! Used by tests and local development. Batches take a single write guard
//! and are validated up front, so they commit all-or-nothing just like the
//! PostgreSQL backend.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use notehub_core::error::AppError;
use notehub_core::result::AppResult;
use notehub_core::traits::store::{BatchOp, DocumentStore, Filter, FilterOp, FilterValue, Query};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// In-process [`DocumentStore`] backed by nested maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compare a record field against a filter value.
///
/// Returns `None` when the two are not comparable (type mismatch), which
/// makes the filter fail.
fn compare(field: Option<&Value>, value: &FilterValue) -> Option<Ordering> {
    match (field, value) {
        (Some(Value::String(a)), FilterValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Some(Value::Number(a)), FilterValue::Integer(b)) => {
            a.as_i64().map(|a| a.cmp(b))
        }
        (Some(Value::Bool(a)), FilterValue::Boolean(b)) => Some(a.cmp(b)),
        (Some(Value::Null), FilterValue::Null) | (None, FilterValue::Null) => {
            Some(Ordering::Equal)
        }
        _ => None,
    }
}

fn matches(record: &Value, filter: &Filter) -> bool {
    let field = record.get(&filter.field);
    match compare(field, &filter.value) {
        Some(ord) => match filter.op {
            FilterOp::Eq => ord == Ordering::Equal,
            FilterOp::Gte => ord != Ordering::Less,
            FilterOp::Lt => ord == Ordering::Less,
        },
        None => false,
    }
}

fn sort_key(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn run_query(records: &BTreeMap<String, Value>, query: &Query) -> Vec<Value> {
    let mut out: Vec<Value> = records
        .values()
        .filter(|r| query.filters.iter().all(|f| matches(r, f)))
        .cloned()
        .collect();

    if let Some(field) = &query.order_by {
        out.sort_by_key(|r| sort_key(r, field));
    }
    if let Some(limit) = query.limit {
        out.truncate(limit);
    }
    out
}

/// Apply a batch to a working copy, failing without side effects on the
/// first invalid op.
fn apply_ops(data: &mut Collections, ops: &[BatchOp]) -> AppResult<()> {
    for op in ops {
        match op {
            BatchOp::Put {
                collection,
                id,
                record,
            } => {
                data.entry(collection.clone())
                    .or_default()
                    .insert(id.clone(), record.clone());
            }
            BatchOp::Delete { collection, id } => {
                if let Some(records) = data.get_mut(collection) {
                    records.remove(id);
                }
            }
            BatchOp::Increment {
                collection,
                id,
                field,
                delta,
            } => {
                let record = data
                    .get_mut(collection)
                    .and_then(|records| records.get_mut(id))
                    .ok_or_else(|| {
                        AppError::store(format!(
                            "Cannot increment '{field}' on missing record {collection}/{id}"
                        ))
                    })?;
                let current = record.get(field).and_then(Value::as_i64).unwrap_or(0);
                record[field.as_str()] = Value::from(current + delta);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Value>> {
        let data = self.data.read().await;
        Ok(data.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn put(&self, collection: &str, id: &str, record: Value) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let mut data = self.data.write().await;
        if let Some(records) = data.get_mut(collection) {
            records.remove(id);
        }
        Ok(())
    }

    async fn get_many(&self, collection: &str, ids: &[String]) -> AppResult<Vec<Value>> {
        // Mirrors the bounded IN-query cardinality of hosted document
        // stores so that callers exercise their chunking paths.
        if ids.len() > self.in_query_limit() {
            return Err(AppError::store(format!(
                "Multi-get accepts at most {} ids, got {}",
                self.in_query_limit(),
                ids.len()
            )));
        }

        let data = self.data.read().await;
        let Some(records) = data.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| records.get(id).cloned())
            .collect())
    }

    async fn query(&self, collection: &str, query: Query) -> AppResult<Vec<Value>> {
        let data = self.data.read().await;
        let Some(records) = data.get(collection) else {
            return Ok(Vec::new());
        };
        let out = run_query(records, &query);
        debug!(collection, results = out.len(), "Memory store query");
        Ok(out)
    }

    async fn find_by_path_prefix(
        &self,
        collection: &str,
        owner_field: &str,
        owner: &str,
        prefix: &str,
    ) -> AppResult<Vec<Value>> {
        // Range scan on the path index: everything in [prefix + "/",
        // prefix + "0") starts with prefix + "/" ('0' follows '/' in
        // ASCII).
        let lower = format!("{prefix}/");
        let upper = format!("{prefix}0");
        let query = Query::new()
            .filter(Filter::eq(owner_field, owner))
            .filter(Filter::new("path", FilterOp::Gte, FilterValue::String(lower)))
            .filter(Filter::new("path", FilterOp::Lt, FilterValue::String(upper)))
            .order_by("path");
        self.query(collection, query).await
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> AppResult<()> {
        let mut data = self.data.write().await;
        // Work on a copy so a failing op leaves the store untouched.
        let mut working = data.clone();
        apply_ops(&mut working, &ops)?;
        *data = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store
            .put("things", "a", json!({"name": "alpha"}))
            .await
            .expect("put");

        let got = store.get("things", "a").await.expect("get");
        assert_eq!(got, Some(json!({"name": "alpha"})));

        store.delete("things", "a").await.expect("delete");
        assert_eq!(store.get("things", "a").await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_query_filters_and_order() {
        let store = MemoryStore::new();
        store
            .put("things", "1", json!({"owner_id": "u1", "path": "/b"}))
            .await
            .unwrap();
        store
            .put("things", "2", json!({"owner_id": "u1", "path": "/a"}))
            .await
            .unwrap();
        store
            .put("things", "3", json!({"owner_id": "u2", "path": "/c"}))
            .await
            .unwrap();

        let results = store
            .query(
                "things",
                Query::new()
                    .filter(Filter::eq("owner_id", "u1"))
                    .order_by("path"),
            )
            .await
            .expect("query");

        let paths: Vec<&str> = results
            .iter()
            .map(|r| r["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn test_null_filter_matches_absent_and_null() {
        let store = MemoryStore::new();
        store
            .put("things", "1", json!({"parent_id": null, "path": "/a"}))
            .await
            .unwrap();
        store
            .put("things", "2", json!({"path": "/b"}))
            .await
            .unwrap();
        store
            .put("things", "3", json!({"parent_id": "x", "path": "/x/c"}))
            .await
            .unwrap();

        let results = store
            .query("things", Query::new().filter(Filter::is_null("parent_id")))
            .await
            .expect("query");
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_path_prefix_excludes_self_and_cousins() {
        let store = MemoryStore::new();
        for (id, path) in [
            ("1", "/a"),
            ("2", "/a/b"),
            ("3", "/a/b/c"),
            ("4", "/ab"),
            ("5", "/z"),
        ] {
            store
                .put("things", id, json!({"owner_id": "u1", "path": path}))
                .await
                .unwrap();
        }

        let results = store
            .find_by_path_prefix("things", "owner_id", "u1", "/a")
            .await
            .expect("scan");
        let paths: Vec<&str> = results
            .iter()
            .map(|r| r["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["/a/b", "/a/b/c"]);
    }

    #[tokio::test]
    async fn test_get_many_rejects_oversized_sets() {
        let store = MemoryStore::new();
        let ids: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let err = store.get_many("things", &ids).await.unwrap_err();
        assert_eq!(err.kind, notehub_core::error::ErrorKind::Store);
    }

    #[tokio::test]
    async fn test_batch_rolls_back_on_bad_increment() {
        let store = MemoryStore::new();
        store
            .put("things", "a", json!({"count": 1}))
            .await
            .unwrap();

        let ops = vec![
            BatchOp::increment("things", "a", "count", 1),
            BatchOp::increment("things", "missing", "count", 1),
        ];
        assert!(store.batch(ops).await.is_err());

        // First increment must not have leaked through.
        let got = store.get("things", "a").await.unwrap().unwrap();
        assert_eq!(got["count"], json!(1));
    }

    #[tokio::test]
    async fn test_batch_applies_all_ops() {
        let store = MemoryStore::new();
        store
            .put("things", "a", json!({"count": 1}))
            .await
            .unwrap();

        let ops = vec![
            BatchOp::put("things", "b", json!({"count": 0})),
            BatchOp::increment("things", "a", "count", 2),
            BatchOp::delete("things", "nonexistent"),
        ];
        store.batch(ops).await.expect("batch");

        assert_eq!(
            store.get("things", "a").await.unwrap().unwrap()["count"],
            json!(3)
        );
        assert!(store.get("things", "b").await.unwrap().is_some());
    }
}
