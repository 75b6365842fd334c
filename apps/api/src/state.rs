use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::feedback::analyzer::ResumeAnalyzer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; there is no process-wide storage singleton.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Serializes write transactions. Analyses hold it across the model call.
    pub write_lock: Arc<Mutex<()>>,
    /// Pluggable analyzer. Default: `LlmAnalyzer`.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
}
