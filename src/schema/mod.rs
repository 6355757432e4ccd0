// Entity schemas: the canonical shape of stored documents, validated when
// they are built from a request payload.
pub mod chapter;
pub mod quiz_question;
pub mod validation;

pub use chapter::Chapter;
pub use quiz_question::{QuizBatch, QuizQuestion, DEFAULT_DIFFICULTY};
pub use validation::ValidationError;
