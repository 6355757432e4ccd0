use axum::{extract::State, Json};

use crate::app::AppState;
use crate::error::ApiResult;
use crate::seed::{seed_sample, SeedReport};

/// POST /api/seed/sample - safe to repeat; tops the sample chapter up to the
/// target question count
pub async fn sample(State(state): State<AppState>) -> ApiResult<Json<SeedReport>> {
    let report = seed_sample(&state.db).await?;
    Ok(Json(report))
}
