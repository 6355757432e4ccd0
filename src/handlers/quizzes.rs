use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::format::documents_to_api_array;
use crate::app::AppState;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::filter::DocumentFilter;
use crate::schema::{QuizBatch, QuizQuestion, ValidationError};

use super::chapters::find_chapter;
use super::json_body;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum number of questions; 0 means no cap.
    pub limit: Option<i64>,
}

/// POST /api/chapters/:chapter_id/quizzes - insert a batch of questions
pub async fn create(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let batch = QuizBatch::from_value(&json_body(payload)?)?;
    if batch.chapter_id != chapter_id || batch.questions.iter().any(|q| q.chapter_id != chapter_id) {
        return Err(ApiError::bad_request("chapter_id mismatch"));
    }

    // Nothing is inserted unless the chapter exists
    let chapter = find_chapter(&state, &chapter_id).await?;

    // Questions are listed by exact `chapter_id`, so only the canonical
    // spelling of the chapter's id may be stored.
    if chapter.id_string() != chapter_id {
        return Err(ApiError::bad_request("Invalid chapter id"));
    }

    let mut ids = Vec::with_capacity(batch.questions.len());
    for question in &batch.questions {
        ids.push(state.db.create(QuizQuestion::COLLECTION, question).await?);
    }

    Ok(Json(json!({ "inserted": ids.len(), "ids": ids })))
}

/// GET /api/chapters/:chapter_id/quizzes?limit=N
///
/// Filters on the stored `chapter_id` only; an unknown or malformed chapter
/// id yields an empty list.
pub async fn list(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) =
        query.map_err(|rejection| ApiError::from(ValidationError::single("limit", rejection.body_text())))?;
    let limit = resolve_limit(query.limit, &state.config.api)?;

    let filter = DocumentFilter::new().where_eq("chapter_id", chapter_id).limit(limit);
    let docs = state.db.list(QuizQuestion::COLLECTION, &filter).await?;
    Ok(Json(documents_to_api_array(docs)))
}

/// Absent uses the configured default and 0 returns every question. Any
/// other value above the configured maximum is clamped to it.
pub(crate) fn resolve_limit(requested: Option<i64>, api: &ApiConfig) -> ApiResult<Option<usize>> {
    let requested = match requested {
        None => api.default_quiz_limit,
        Some(n) if n < 0 => {
            return Err(ValidationError::single("limit", "must be greater than or equal to 0").into());
        }
        Some(0) => return Ok(None),
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    };

    Ok(Some(match api.max_quiz_limit {
        Some(max) if requested > max => {
            tracing::warn!("Quiz limit {} exceeds max {}, capping to max", requested, max);
            max
        }
        _ => requested,
    }))
}
