//! Analyze orchestration: validate, persist the resume, ask the model, decode,
//! persist the feedback. Both rows commit together or not at all.

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::feedback::analyzer::ResumeAnalyzer;
use crate::feedback::schema::FeedbackDraft;
use crate::feedback::store::{insert_feedback, insert_resume};
use crate::models::feedback::FeedbackRow;

pub const MIN_CONTENT_CHARS: usize = 50;
pub const MAX_CONTENT_CHARS: usize = 15_000;

/// Trims the submitted text and checks its length in characters.
/// Bounds are inclusive. Whitespace-only text counts as submitted but too short.
pub fn validate_content(content: Option<&str>) -> Result<&str, AppError> {
    let content = match content {
        Some(text) if !text.is_empty() => text.trim(),
        _ => {
            return Err(AppError::Validation(
                "Resume content is required".to_string(),
            ))
        }
    };

    let chars = content.chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Resume content is too short. Please provide at least {MIN_CONTENT_CHARS} characters."
        )));
    }
    if chars > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Resume content is too long. Maximum is {MAX_CONTENT_CHARS} characters."
        )));
    }
    Ok(content)
}

/// Runs one analysis for already-validated content.
///
/// The resume insert is flushed inside a transaction before the model call so
/// it has an id, and is rolled back on any failure after that point.
///
/// `write_lock` is held for the whole transaction. The flushed insert keeps
/// SQLite's write lock until commit, so other writers queue on the gate
/// instead of failing with `SQLITE_BUSY`.
pub async fn analyze_resume(
    pool: &SqlitePool,
    write_lock: &Mutex<()>,
    analyzer: &dyn ResumeAnalyzer,
    content: &str,
) -> Result<FeedbackRow, AppError> {
    let _write = write_lock.lock().await;
    let mut tx = pool.begin().await?;
    let resume = insert_resume(&mut *tx, content).await?;

    let draft = match request_draft(analyzer, content).await {
        Ok(draft) => draft,
        Err(e) => {
            warn!("Analysis for pending resume {} failed: {e}", resume.id);
            tx.rollback().await?;
            return Err(e);
        }
    };

    let feedback = insert_feedback(&mut *tx, resume.id, &draft).await?;
    tx.commit().await?;

    info!(
        "Stored feedback {} for resume {} (score {})",
        feedback.id, resume.id, feedback.score
    );
    Ok(feedback)
}

async fn request_draft(
    analyzer: &dyn ResumeAnalyzer,
    content: &str,
) -> Result<FeedbackDraft, AppError> {
    let value = analyzer.analyze(content).await?;
    FeedbackDraft::from_ai_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init_schema, memory_pool};
    use crate::feedback::analyzer::AnalyzerError;
    use crate::feedback::store::{delete_feedback, find_feedback};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    struct Replies(fn() -> Result<Value, AnalyzerError>);

    #[async_trait]
    impl ResumeAnalyzer for Replies {
        async fn analyze(&self, _resume_text: &str) -> Result<Value, AnalyzerError> {
            (self.0)()
        }
    }

    /// Answers well-formed feedback after a delay, like a slow provider.
    struct Slow(Duration);

    #[async_trait]
    impl ResumeAnalyzer for Slow {
        async fn analyze(&self, _resume_text: &str) -> Result<Value, AnalyzerError> {
            tokio::time::sleep(self.0).await;
            well_formed()
        }
    }

    fn well_formed() -> Result<Value, AnalyzerError> {
        Ok(json!({
            "strengths": "Concrete metrics throughout.",
            "weaknesses": "Skills section is a wall of text.",
            "missing_keywords": ["Terraform"],
            "suggestions": ["Group skills", "Add links", "Cut the objective"],
            "score": 11
        }))
    }

    fn unparseable() -> Result<Value, AnalyzerError> {
        Err(AnalyzerError::Format(
            serde_json::from_str::<Value>("not json").unwrap_err(),
        ))
    }

    fn unreachable_provider() -> Result<Value, AnalyzerError> {
        Err(AnalyzerError::Call("connection refused".to_string()))
    }

    fn no_score() -> Result<Value, AnalyzerError> {
        let mut value = well_formed()?;
        value.as_object_mut().unwrap().remove("score");
        Ok(value)
    }

    async fn resume_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM resumes")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn resume_text() -> String {
        "Senior engineer with eight years of backend experience. ".repeat(3)
    }

    #[test]
    fn test_validate_trims_before_measuring() {
        let padded = format!("   {}   ", "x".repeat(MIN_CONTENT_CHARS));
        assert_eq!(validate_content(Some(padded.as_str())).unwrap().len(), MIN_CONTENT_CHARS);

        let short_after_trim = format!("{}\n\n\n", "x".repeat(MIN_CONTENT_CHARS - 1));
        assert!(matches!(
            validate_content(Some(short_after_trim.as_str())),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_bounds_are_inclusive() {
        assert!(validate_content(Some("a".repeat(MIN_CONTENT_CHARS).as_str())).is_ok());
        assert!(validate_content(Some("a".repeat(MAX_CONTENT_CHARS).as_str())).is_ok());
        assert!(validate_content(Some("a".repeat(MAX_CONTENT_CHARS + 1).as_str())).is_err());
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        // 50 two-byte characters
        let text = "é".repeat(MIN_CONTENT_CHARS);
        assert!(validate_content(Some(text.as_str())).is_ok());
    }

    #[test]
    fn test_validate_missing_or_empty_is_required() {
        for input in [None, Some("")] {
            match validate_content(input) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "Resume content is required"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_whitespace_only_is_too_short() {
        match validate_content(Some("   \n\t ")) {
            Err(AppError::Validation(msg)) => assert_eq!(
                msg,
                "Resume content is too short. Please provide at least 50 characters."
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_commits_both_rows_and_clamps_score() {
        let pool = memory_pool().await;
        let feedback = analyze_resume(
            &pool,
            &Mutex::new(()),
            &Replies(well_formed),
            &resume_text(),
        )
        .await
        .unwrap();

        assert_eq!(feedback.score, 10);
        assert_eq!(feedback.score_rationale.as_deref(), Some(""));
        assert_eq!(feedback.missing_keywords.0, vec!["Terraform"]);
        assert_eq!(resume_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_format_error_rolls_back() {
        let pool = memory_pool().await;
        let err = analyze_resume(
            &pool,
            &Mutex::new(()),
            &Replies(unparseable),
            &resume_text(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::AiFormat));
        assert_eq!(resume_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_call_error_rolls_back_and_keeps_text() {
        let pool = memory_pool().await;
        let err = analyze_resume(
            &pool,
            &Mutex::new(()),
            &Replies(unreachable_provider),
            &resume_text(),
        )
        .await
        .unwrap_err();
        match err {
            AppError::AiCall(msg) => assert_eq!(msg, "connection refused"),
            other => panic!("expected AiCall, got {other:?}"),
        }
        assert_eq!(resume_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_missing_field_rolls_back() {
        let pool = memory_pool().await;
        let err = analyze_resume(
            &pool,
            &Mutex::new(()),
            &Replies(no_score),
            &resume_text(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::AiMissingField("score")));
        assert_eq!(resume_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_writers_wait_for_in_flight_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("resumes.db").display());
        let pool = create_pool(&url).await.unwrap();
        init_schema(&pool).await.unwrap();
        let write_lock = Arc::new(Mutex::new(()));

        let seeded = analyze_resume(&pool, &write_lock, &Replies(well_formed), &resume_text())
            .await
            .unwrap();

        let slow = tokio::spawn({
            let (pool, write_lock) = (pool.clone(), write_lock.clone());
            async move {
                let analyzer = Slow(Duration::from_millis(1500));
                analyze_resume(&pool, &write_lock, &analyzer, &resume_text()).await
            }
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        let (fast, text) = (Replies(well_formed), resume_text());
        let (deleted, second) = tokio::join!(
            delete_feedback(&pool, &write_lock, seeded.id),
            analyze_resume(&pool, &write_lock, &fast, &text),
        );
        let slow = slow.await.unwrap();

        assert!(deleted.unwrap());
        assert!(find_feedback(&pool, seeded.id).await.unwrap().is_none());
        assert!(find_feedback(&pool, second.unwrap().id).await.unwrap().is_some());
        assert!(find_feedback(&pool, slow.unwrap().id).await.unwrap().is_some());
        assert_eq!(resume_count(&pool).await, 2);
    }
}
