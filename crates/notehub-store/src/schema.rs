//! Records table setup for the PostgreSQL backend.

use sqlx::PgPool;
use tracing::info;

use notehub_core::error::{AppError, ErrorKind};

const CREATE_RECORDS: &str = "CREATE TABLE IF NOT EXISTS records ( \
    collection TEXT NOT NULL, \
    id TEXT NOT NULL, \
    data JSONB NOT NULL, \
    PRIMARY KEY (collection, id) \
)";

const CREATE_OWNER_PATH_INDEX: &str = "CREATE INDEX IF NOT EXISTS records_owner_path_idx \
    ON records (collection, (data->>'owner_id'), (data->>'path'))";

/// Create the records table and its indexes if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    info!("Ensuring records table schema");

    for statement in [CREATE_RECORDS, CREATE_OWNER_PATH_INDEX] {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Store, format!("Schema setup failed: {e}"), e)
        })?;
    }

    Ok(())
}
