#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One analysis. The two list columns hold JSON-encoded `Vec<String>` text.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub resume_id: i64,
    pub strengths: String,
    pub weaknesses: String,
    pub missing_keywords: Json<Vec<String>>,
    pub suggestions: Json<Vec<String>>,
    pub score: i64,
    pub score_rationale: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A feedback row joined with the text of the resume it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackWithResumeRow {
    #[sqlx(flatten)]
    pub feedback: FeedbackRow,
    pub resume_content: String,
}
