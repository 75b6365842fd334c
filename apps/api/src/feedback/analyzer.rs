//! Resume analyzer: the boundary that turns resume text into the model's raw
//! JSON mapping.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`. Production uses `LlmAnalyzer`;
//! tests swap in scripted analyzers without touching the handlers.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::feedback::prompts::{build_review_prompt, REVIEW_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The reply, with code fences removed, was not valid JSON.
    #[error("unparseable model output: {0}")]
    Format(#[source] serde_json::Error),

    /// Anything else: transport, provider status, empty reply.
    #[error("{0}")]
    Call(String),
}

impl From<LlmError> for AnalyzerError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(e) => AnalyzerError::Format(e),
            other => AnalyzerError::Call(other.to_string()),
        }
    }
}

/// Sends one resume to the model and returns its decoded JSON document.
///
/// Field presence and types are not checked here; see `feedback::schema`.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str) -> Result<Value, AnalyzerError>;
}

/// Analyzer backed by the chat-completions API.
pub struct LlmAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for LlmAnalyzer {
    async fn analyze(&self, resume_text: &str) -> Result<Value, AnalyzerError> {
        let prompt = build_review_prompt(resume_text);
        Ok(self.0.call_json::<Value>(&prompt, REVIEW_SYSTEM).await?)
    }
}
