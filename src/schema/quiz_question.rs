use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::validation::{parse, ValidationError};

pub const DEFAULT_DIFFICULTY: &str = "OSN-N";

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

/// A multiple-choice question attached to a chapter. Stored in the
/// `quizquestion` collection.
///
/// `correct_index` is only bounded below; it is not checked against the
/// length of `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct QuizQuestion {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub chapter_id: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub question: String,
    #[validate(length(min = 2, message = "must contain at least 2 items"))]
    pub options: Vec<String>,
    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    pub correct_index: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub explanation: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

impl QuizQuestion {
    pub const COLLECTION: &'static str = "quizquestion";
    pub const MIN_OPTIONS: usize = 2;

    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        parse(value)
    }
}

/// Body of `POST /api/chapters/{chapter_id}/quizzes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct QuizBatch {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub chapter_id: String,
    #[validate(nested)]
    pub questions: Vec<QuizQuestion>,
}

impl QuizBatch {
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        parse(value)
    }
}
