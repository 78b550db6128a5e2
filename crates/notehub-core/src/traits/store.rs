//! Generic document-store abstraction.
//!
//! The engine never talks to a concrete database directly. Every record is
//! a JSON document in a named collection, and all persistence goes through
//! [`DocumentStore`]. Backends must provide per-record atomicity plus an
//! atomic multi-record [`DocumentStore::batch`]; they are **not** expected
//! to offer read-then-write transactions, so uniqueness checks performed
//! before a write remain best-effort (see the service layer's conflict
//! handling).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::limits;
use crate::result::AppResult;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Greater than or equal (string ordering for string fields).
    Gte,
    /// Strictly less than.
    Lt,
}

/// A dynamic filter value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value.
    Boolean(bool),
    /// Null / field absent (only meaningful with [`FilterOp::Eq`]).
    Null,
}

/// A single filter condition on a named top-level field of the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// The field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl Filter {
    /// Create a new filter.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter on a string field.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::String(value.into()))
    }

    /// Shorthand for an is-null filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::Null)
    }
}

/// An indexed query over one collection.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Conjunctive filter conditions.
    pub filters: Vec<Filter>,
    /// Optional field to order by, ascending.
    pub order_by: Option<String>,
    /// Optional maximum number of records to return.
    pub limit: Option<usize>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order results by a field, ascending.
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A single write inside an atomic batch.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Insert or replace a record.
    Put {
        /// Target collection.
        collection: String,
        /// Record id.
        id: String,
        /// Full record body.
        record: Value,
    },
    /// Delete a record (no-op if absent).
    Delete {
        /// Target collection.
        collection: String,
        /// Record id.
        id: String,
    },
    /// Add a signed delta to a numeric field of an existing record.
    Increment {
        /// Target collection.
        collection: String,
        /// Record id.
        id: String,
        /// Field holding an integer counter.
        field: String,
        /// Signed delta to apply.
        delta: i64,
    },
}

impl BatchOp {
    /// Build a put operation.
    pub fn put(collection: impl Into<String>, id: impl Into<String>, record: Value) -> Self {
        Self::Put {
            collection: collection.into(),
            id: id.into(),
            record,
        }
    }

    /// Build a delete operation.
    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Build an increment operation.
    pub fn increment(
        collection: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
        delta: i64,
    ) -> Self {
        Self::Increment {
            collection: collection.into(),
            id: id.into(),
            field: field.into(),
            delta,
        }
    }
}

/// The store interface every backend implements.
///
/// Records are schemaless JSON documents; the entity crate's serde output
/// is the persisted shape. Collections are flat namespaces identified by
/// name.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Fetch a single record by id.
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Value>>;

    /// Insert or replace a single record.
    async fn put(&self, collection: &str, id: &str, record: Value) -> AppResult<()>;

    /// Delete a single record. Deleting an absent record is not an error.
    async fn delete(&self, collection: &str, id: &str) -> AppResult<()>;

    /// Fetch up to [`DocumentStore::in_query_limit`] records by id.
    ///
    /// Missing ids are skipped; result order is unspecified.
    async fn get_many(&self, collection: &str, ids: &[String]) -> AppResult<Vec<Value>>;

    /// Run an indexed query against a collection.
    async fn query(&self, collection: &str, query: Query) -> AppResult<Vec<Value>>;

    /// Fetch every record of an owner whose `path` field starts with
    /// `prefix + "/"`, ordered by path ascending.
    ///
    /// The record at `prefix` itself is **not** included. Backends choose
    /// their own mechanism (range scan on a path index, SQL `LIKE`).
    async fn find_by_path_prefix(
        &self,
        collection: &str,
        owner_field: &str,
        owner: &str,
        prefix: &str,
    ) -> AppResult<Vec<Value>>;

    /// Commit a set of writes atomically: all ops apply or none do.
    async fn batch(&self, ops: Vec<BatchOp>) -> AppResult<()>;

    /// Maximum id cardinality accepted by [`DocumentStore::get_many`].
    fn in_query_limit(&self) -> usize {
        limits::IN_QUERY_LIMIT
    }
}
