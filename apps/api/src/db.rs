use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const CREATE_RESUMES: &str = r#"
CREATE TABLE IF NOT EXISTS resumes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_FEEDBACK: &str = r#"
CREATE TABLE IF NOT EXISTS feedback (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    resume_id         INTEGER NOT NULL REFERENCES resumes(id) ON DELETE CASCADE,
    strengths         TEXT NOT NULL,
    weaknesses        TEXT NOT NULL,
    missing_keywords  TEXT NOT NULL,
    suggestions       TEXT NOT NULL,
    score             INTEGER NOT NULL,
    score_rationale   TEXT,
    created_at        TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_FEEDBACK_RESUME_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_feedback_resume_id ON feedback (resume_id)";

/// Creates the SQLite connection pool, creating the database file if absent.
/// WAL mode keeps list/get readers unblocked while an analysis transaction
/// is waiting on the model.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database...");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the `resumes` and `feedback` tables when they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in [CREATE_RESUMES, CREATE_FEEDBACK, CREATE_FEEDBACK_RESUME_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}

/// Single-connection in-memory pool with the schema applied.
/// The connection is never recycled, since that would discard the database.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_creates_missing_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumes.db");
        let url = format!("sqlite://{}", path.display());

        let pool = create_pool(&url).await.unwrap();
        init_schema(&pool).await.unwrap();
        assert!(path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('resumes', 'feedback') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["feedback".to_string(), "resumes".to_string()]);
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let pool = memory_pool().await;
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_deleting_resume_cascades_to_feedback() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO resumes (id, content) VALUES (1, 'text')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO feedback (resume_id, strengths, weaknesses, missing_keywords, suggestions, score) \
             VALUES (1, 's', 'w', '[]', '[]', 5)",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM resumes WHERE id = 1")
            .execute(&pool)
            .await
            .unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_feedback_requires_existing_resume() {
        let pool = memory_pool().await;
        let result = sqlx::query(
            "INSERT INTO feedback (resume_id, strengths, weaknesses, missing_keywords, suggestions, score) \
             VALUES (42, 's', 'w', '[]', '[]', 5)",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
