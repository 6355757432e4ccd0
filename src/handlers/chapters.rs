use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::api::format::{document_to_api_value, documents_to_api_array};
use crate::app::AppState;
use crate::database::{DatabaseError, Document};
use crate::error::{ApiError, ApiResult};
use crate::filter::DocumentFilter;
use crate::schema::Chapter;

use super::json_body;

/// POST /api/chapters - validate and insert one chapter
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let chapter = Chapter::from_value(&json_body(payload)?)?;
    let id = state.db.create(Chapter::COLLECTION, &chapter).await?;
    Ok(Json(json!({ "id": id })))
}

/// GET /api/chapters - every chapter, ascending by number
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let mut docs = state.db.list(Chapter::COLLECTION, &DocumentFilter::new()).await?;
    // Stable: equal numbers keep insertion order
    docs.sort_by_key(|d| d.get_i64("number").unwrap_or(0));
    Ok(Json(documents_to_api_array(docs)))
}

/// GET /api/chapters/:chapter_id
pub async fn show(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let doc = find_chapter(&state, &chapter_id).await?;
    Ok(Json(document_to_api_value(doc)))
}

/// Chapter lookup shared with the quiz handlers: 400 for a malformed id,
/// 404 when nothing matches.
pub(crate) async fn find_chapter(state: &AppState, chapter_id: &str) -> ApiResult<Document> {
    match state.db.get_by_id(Chapter::COLLECTION, chapter_id).await {
        Ok(Some(doc)) => Ok(doc),
        Ok(None) => Err(ApiError::not_found("Chapter not found")),
        Err(DatabaseError::InvalidIdentifier(_)) => Err(ApiError::bad_request("Invalid chapter id")),
        Err(e) => Err(e.into()),
    }
}
