//! Strict decode of the model's JSON document into a storable feedback draft.
//!
//! Either every field is present and well-typed, or the whole document is
//! rejected. Nothing is partially trusted.

use serde_json::{Map, Value};

use crate::errors::AppError;

/// Fields the model must return, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "strengths",
    "weaknesses",
    "missing_keywords",
    "suggestions",
    "score",
];

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 10;

/// Validated analysis, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackDraft {
    pub strengths: String,
    pub weaknesses: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    /// Always within `MIN_SCORE..=MAX_SCORE`.
    pub score: i64,
    /// Empty when the model gave none.
    pub score_rationale: String,
}

impl FeedbackDraft {
    pub fn from_ai_value(value: Value) -> Result<Self, AppError> {
        let Value::Object(mut doc) = value else {
            return Err(AppError::AiFormat);
        };

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !doc.contains_key(**f)) {
            return Err(AppError::AiMissingField(*missing));
        }

        Ok(FeedbackDraft {
            strengths: take_string(&mut doc, "strengths")?,
            weaknesses: take_string(&mut doc, "weaknesses")?,
            missing_keywords: take_string_list(&mut doc, "missing_keywords")?,
            suggestions: take_string_list(&mut doc, "suggestions")?,
            score: coerce_score(&doc["score"])
                .ok_or(AppError::AiInvalidField("score"))?
                .clamp(MIN_SCORE, MAX_SCORE),
            score_rationale: match doc.remove("score_rationale") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s,
                Some(_) => return Err(AppError::AiInvalidField("score_rationale")),
            },
        })
    }
}

fn take_string(doc: &mut Map<String, Value>, field: &'static str) -> Result<String, AppError> {
    match doc.remove(field) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(AppError::AiInvalidField(field)),
    }
}

fn take_string_list(
    doc: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, AppError> {
    let Some(Value::Array(items)) = doc.remove(field) else {
        return Err(AppError::AiInvalidField(field));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(AppError::AiInvalidField(field)),
        })
        .collect()
}

/// Integer cast of the score: integers as-is, floats truncated toward zero,
/// numeric strings parsed. Booleans, nulls and containers are rejected.
fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .map(|f| f.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
