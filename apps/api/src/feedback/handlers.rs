//! Axum route handlers for the Feedback API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::feedback::analysis::{analyze_resume, validate_content};
use crate::feedback::store::{delete_feedback, find_feedback, list_feedback};
use crate::models::feedback::{FeedbackRow, FeedbackWithResumeRow};
use crate::state::AppState;

const PREVIEW_CHARS: usize = 120;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub content: Option<String>,
}

/// Body of a successful POST /analyze.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub id: i64,
    pub resume_id: i64,
    pub strengths: String,
    pub weaknesses: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub score: i64,
    pub score_rationale: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry of GET /analyses.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub id: i64,
    pub resume_id: i64,
    pub resume_preview: String,
    pub score: i64,
    pub score_rationale: Option<String>,
    pub strengths: String,
    pub weaknesses: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of GET /analysis/:id, carrying the full resume text.
#[derive(Debug, Serialize)]
pub struct AnalysisDetail {
    pub id: i64,
    pub resume_id: i64,
    pub resume_content: String,
    pub strengths: String,
    pub weaknesses: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub score: i64,
    pub score_rationale: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl From<FeedbackRow> for AnalysisResponse {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: row.id,
            resume_id: row.resume_id,
            strengths: row.strengths,
            weaknesses: row.weaknesses,
            missing_keywords: row.missing_keywords.0,
            suggestions: row.suggestions.0,
            score: row.score,
            score_rationale: row.score_rationale,
            created_at: row.created_at,
        }
    }
}

impl From<FeedbackWithResumeRow> for AnalysisSummary {
    fn from(row: FeedbackWithResumeRow) -> Self {
        let f = row.feedback;
        Self {
            id: f.id,
            resume_id: f.resume_id,
            resume_preview: resume_preview(&row.resume_content),
            score: f.score,
            score_rationale: f.score_rationale,
            strengths: f.strengths,
            weaknesses: f.weaknesses,
            missing_keywords: f.missing_keywords.0,
            suggestions: f.suggestions.0,
            created_at: f.created_at,
        }
    }
}

impl From<FeedbackWithResumeRow> for AnalysisDetail {
    fn from(row: FeedbackWithResumeRow) -> Self {
        let f = row.feedback;
        Self {
            id: f.id,
            resume_id: f.resume_id,
            resume_content: row.resume_content,
            strengths: f.strengths,
            weaknesses: f.weaknesses,
            missing_keywords: f.missing_keywords.0,
            suggestions: f.suggestions.0,
            score: f.score,
            score_rationale: f.score_rationale,
            created_at: f.created_at,
        }
    }
}

/// First `PREVIEW_CHARS` characters, with "..." appended when text was cut.
pub fn resume_preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

fn analysis_not_found() -> AppError {
    AppError::NotFound("Analysis not found".to_string())
}

/// Ids that are not integers cannot name an analysis.
fn analysis_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| analysis_not_found())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// A body that is not JSON, or whose `content` is not a string, counts as
/// missing content.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalysisResponse>), AppError> {
    let request = payload.map(|Json(req)| req).ok();
    let content = validate_content(request.as_ref().and_then(|r| r.content.as_deref()))?;

    let feedback = analyze_resume(
        &state.db,
        &state.write_lock,
        state.analyzer.as_ref(),
        content,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(feedback.into())))
}

/// GET /analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnalysisSummary>>, AppError> {
    let rows = list_feedback(&state.db).await?;
    Ok(Json(rows.into_iter().map(AnalysisSummary::from).collect()))
}

/// GET /analysis/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<AnalysisDetail>, AppError> {
    let id = analysis_id(path)?;
    let row = find_feedback(&state.db, id)
        .await?
        .ok_or_else(analysis_not_found)?;
    Ok(Json(row.into()))
}

/// DELETE /analysis/:id
pub async fn handle_delete_analysis(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = analysis_id(path)?;
    if !delete_feedback(&state.db, &state.write_lock, id).await? {
        return Err(analysis_not_found());
    }
    tracing::info!("Deleted analysis {id} and its resume");
    Ok(Json(DeleteResponse {
        message: "Deleted successfully".to_string(),
    }))
}
