// Request handlers, one module per resource.
pub mod chapters;
pub mod diagnostics;
pub mod quizzes;
pub mod root;
pub mod seed;

pub use diagnostics::test_database;
pub use root::{health, root};

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::schema::ValidationError;

/// Unwrap a JSON body, treating an unreadable body like any other payload
/// that fails validation.
pub(crate) fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ValidationError::single("body", rejection.body_text()).into()),
    }
}
