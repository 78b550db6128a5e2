//! PostgreSQL-backed document store.
//!
//! All records live in a single `records` table keyed by `(collection,
//! id)` with a JSONB payload; queries filter on JSONB expressions and the
//! path-prefix descendant scan uses `LIKE prefix || '/%'`. Batches run
//! inside a transaction.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use notehub_core::config::DatabaseConfig;
use notehub_core::error::{AppError, ErrorKind};
use notehub_core::result::AppResult;
use notehub_core::traits::store::{BatchOp, DocumentStore, FilterOp, FilterValue, Query};

use crate::schema;

/// [`DocumentStore`] implementation over a PostgreSQL JSONB records table.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store over an existing connection pool.
    ///
    /// Call [`crate::schema::ensure_schema`] before first use.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool from configuration and ensure the records schema.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL record store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(store_err("Failed to connect to PostgreSQL"))?;

        schema::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }
}

/// Redact the credential portion of a connection URL for logging.
fn redact_url(url: &str) -> String {
    let Some((head, tail)) = url.split_once('@') else {
        return url.to_string();
    };
    match head.rsplit_once(':') {
        // The colon must sit past the scheme separator to be a password.
        Some((user, _)) if user.contains("//") => format!("{user}:****@{tail}"),
        _ => url.to_string(),
    }
}

fn store_err(context: &str) -> impl Fn(sqlx::Error) -> AppError + '_ {
    move |e| AppError::with_source(ErrorKind::Store, format!("{context}: {e}"), e)
}

/// Escape `LIKE` metacharacters in a literal path prefix.
///
/// Directory names may contain `%` and `_`; without escaping, a prefix
/// like `/50%` would match `/500/x` and drag unrelated subtrees into
/// rename and delete cascades.
fn escape_like(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A positional bind argument for dynamically built SQL.
enum Bind {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// Render the WHERE fragment for a query's filters.
///
/// Field names only ever come from in-crate constants, never from user
/// input, so they are interpolated directly.
fn build_where(query: &Query, sql: &mut String, binds: &mut Vec<Bind>) {
    for filter in &query.filters {
        let field = &filter.field;
        match (&filter.op, &filter.value) {
            (FilterOp::Eq, FilterValue::Null) => {
                sql.push_str(&format!(
                    " AND (data->'{field}' IS NULL OR data->'{field}' = 'null'::jsonb)"
                ));
            }
            (op, value) => {
                let cmp = match op {
                    FilterOp::Eq => "=",
                    FilterOp::Gte => ">=",
                    FilterOp::Lt => "<",
                };
                match value {
                    FilterValue::String(s) => {
                        binds.push(Bind::Str(s.clone()));
                        sql.push_str(&format!(" AND data->>'{field}' {cmp} ${}", binds.len() + 1));
                    }
                    FilterValue::Integer(i) => {
                        binds.push(Bind::Int(*i));
                        sql.push_str(&format!(
                            " AND (data->>'{field}')::bigint {cmp} ${}",
                            binds.len() + 1
                        ));
                    }
                    FilterValue::Boolean(b) => {
                        binds.push(Bind::Bool(*b));
                        sql.push_str(&format!(
                            " AND (data->>'{field}')::boolean {cmp} ${}",
                            binds.len() + 1
                        ));
                    }
                    FilterValue::Null => {
                        // Range comparisons against null never match.
                        sql.push_str(" AND FALSE");
                    }
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Value>> {
        sqlx::query_scalar::<_, Value>(
            "SELECT data FROM records WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err("Failed to get record"))
    }

    async fn put(&self, collection: &str, id: &str, record: Value) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO records (collection, id, data) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(collection)
        .bind(id)
        .bind(record)
        .execute(&self.pool)
        .await
        .map_err(store_err("Failed to put record"))?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err("Failed to delete record"))?;
        Ok(())
    }

    async fn get_many(&self, collection: &str, ids: &[String]) -> AppResult<Vec<Value>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, Value>(
            "SELECT data FROM records WHERE collection = $1 AND id = ANY($2)",
        )
        .bind(collection)
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err("Failed to multi-get records"))
    }

    async fn query(&self, collection: &str, query: Query) -> AppResult<Vec<Value>> {
        let mut sql = String::from("SELECT data FROM records WHERE collection = $1");
        let mut binds: Vec<Bind> = Vec::new();
        build_where(&query, &mut sql, &mut binds);

        if let Some(field) = &query.order_by {
            sql.push_str(&format!(" ORDER BY data->>'{field}' ASC"));
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        debug!(collection, sql = %sql, "Postgres store query");

        let mut q = sqlx::query_scalar::<_, Value>(&sql).bind(collection);
        for bind in &binds {
            q = match bind {
                Bind::Str(s) => q.bind(s.clone()),
                Bind::Int(i) => q.bind(*i),
                Bind::Bool(b) => q.bind(*b),
            };
        }

        q.fetch_all(&self.pool)
            .await
            .map_err(store_err("Failed to query records"))
    }

    async fn find_by_path_prefix(
        &self,
        collection: &str,
        owner_field: &str,
        owner: &str,
        prefix: &str,
    ) -> AppResult<Vec<Value>> {
        let sql = format!(
            "SELECT data FROM records WHERE collection = $1 \
             AND data->>'{owner_field}' = $2 \
             AND data->>'path' LIKE $3 || '/%' ESCAPE '\\' \
             ORDER BY data->>'path' ASC"
        );
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(collection)
            .bind(owner)
            .bind(escape_like(prefix))
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("Failed to scan path prefix"))
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_err("Failed to begin batch"))?;

        for op in &ops {
            match op {
                BatchOp::Put {
                    collection,
                    id,
                    record,
                } => {
                    sqlx::query(
                        "INSERT INTO records (collection, id, data) VALUES ($1, $2, $3) \
                         ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data",
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(record.clone())
                    .execute(&mut *tx)
                    .await
                    .map_err(store_err("Batch put failed"))?;
                }
                BatchOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
                        .bind(collection)
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                        .map_err(store_err("Batch delete failed"))?;
                }
                BatchOp::Increment {
                    collection,
                    id,
                    field,
                    delta,
                } => {
                    let result = sqlx::query(
                        "UPDATE records SET data = jsonb_set(data, ARRAY[$3], \
                         to_jsonb(COALESCE((data->>$3)::bigint, 0) + $4)) \
                         WHERE collection = $1 AND id = $2",
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(field)
                    .bind(delta)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_err("Batch increment failed"))?;

                    if result.rows_affected() == 0 {
                        return Err(AppError::store(format!(
                            "Cannot increment '{field}' on missing record {collection}/{id}"
                        )));
                    }
                }
            }
        }

        tx.commit().await.map_err(store_err("Failed to commit batch"))
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_like, redact_url};

    #[test]
    fn test_redact_url_hides_password_only() {
        assert_eq!(
            redact_url("postgres://notehub:hunter2@db:5432/notehub"),
            "postgres://notehub:****@db:5432/notehub"
        );
        assert_eq!(
            redact_url("postgres://notehub@db:5432/notehub"),
            "postgres://notehub@db:5432/notehub"
        );
        assert_eq!(
            redact_url("postgres://localhost:5432/notehub"),
            "postgres://localhost:5432/notehub"
        );
    }

    #[test]
    fn test_escape_like_passes_plain_prefixes_through() {
        assert_eq!(escape_like("/Projects/Web"), "/Projects/Web");
    }

    #[test]
    fn test_escape_like_quotes_metacharacters() {
        assert_eq!(escape_like("/50%"), "/50\\%");
        assert_eq!(escape_like("/a_b"), "/a\\_b");
        assert_eq!(escape_like("/x\\y"), "/x\\\\y");
    }
}
