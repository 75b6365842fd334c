use chrono::Utc;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;

use crate::feedback::schema::FeedbackDraft;
use crate::models::feedback::{FeedbackRow, FeedbackWithResumeRow, ResumeRow};

const FEEDBACK_WITH_RESUME: &str = r#"
    SELECT f.id, f.resume_id, f.strengths, f.weaknesses, f.missing_keywords,
           f.suggestions, f.score, f.score_rationale, f.created_at,
           r.content AS resume_content
    FROM feedback f
    JOIN resumes r ON r.id = f.resume_id
"#;

/// Inserts a resume on the caller's connection (usually an open transaction)
/// and returns it with its assigned id.
pub async fn insert_resume(
    conn: &mut SqliteConnection,
    content: &str,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "INSERT INTO resumes (content, created_at) VALUES (?, ?) RETURNING id, content, created_at",
    )
    .bind(content)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

pub async fn insert_feedback(
    conn: &mut SqliteConnection,
    resume_id: i64,
    draft: &FeedbackDraft,
) -> Result<FeedbackRow, sqlx::Error> {
    sqlx::query_as::<_, FeedbackRow>(
        r#"
        INSERT INTO feedback
            (resume_id, strengths, weaknesses, missing_keywords, suggestions,
             score, score_rationale, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, resume_id, strengths, weaknesses, missing_keywords, suggestions,
                  score, score_rationale, created_at
        "#,
    )
    .bind(resume_id)
    .bind(&draft.strengths)
    .bind(&draft.weaknesses)
    .bind(Json(&draft.missing_keywords))
    .bind(Json(&draft.suggestions))
    .bind(draft.score)
    .bind(&draft.score_rationale)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

/// All analyses, newest first. Ties on the timestamp fall back to the id.
pub async fn list_feedback(pool: &SqlitePool) -> Result<Vec<FeedbackWithResumeRow>, sqlx::Error> {
    let sql = format!("{FEEDBACK_WITH_RESUME} ORDER BY f.created_at DESC, f.id DESC");
    sqlx::query_as::<_, FeedbackWithResumeRow>(&sql)
        .fetch_all(pool)
        .await
}

pub async fn find_feedback(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<FeedbackWithResumeRow>, sqlx::Error> {
    let sql = format!("{FEEDBACK_WITH_RESUME} WHERE f.id = ?");
    sqlx::query_as::<_, FeedbackWithResumeRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Deletes a feedback row and the resume it belongs to in one transaction.
/// Returns `false` when no feedback has that id.
///
/// Waits on `write_lock` while an analysis transaction is open.
pub async fn delete_feedback(
    pool: &SqlitePool,
    write_lock: &Mutex<()>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let _write = write_lock.lock().await;
    let mut tx = pool.begin().await?;

    let resume_id: Option<i64> = sqlx::query_scalar("SELECT resume_id FROM feedback WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(resume_id) = resume_id else {
        tx.rollback().await?;
        return Ok(false);
    };

    sqlx::query("DELETE FROM feedback WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM resumes WHERE id = ?")
        .bind(resume_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
