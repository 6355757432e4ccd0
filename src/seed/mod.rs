// Sample content bootstrap: one reference chapter and its question set.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::database::document::parse_id;
use crate::database::{DatabaseError, DatabaseManager, Document};
use crate::filter::DocumentFilter;
use crate::schema::{Chapter, QuizQuestion, ValidationError};

/// Questions the sample chapter is topped up to.
pub const TARGET_QUESTION_COUNT: u64 = 20;

pub const SAMPLE_CHAPTER_NUMBER: i64 = 1;

const SAMPLE_CONTENT: &str = include_str!("sample_chapter.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Sample content is invalid: {0}")]
    InvalidSample(String),
}

impl From<ValidationError> for SeedError {
    fn from(err: ValidationError) -> Self {
        let fields: Vec<String> = err
            .field_errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        SeedError::InvalidSample(fields.join(", "))
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(err: serde_json::Error) -> Self {
        SeedError::InvalidSample(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedReport {
    pub chapter_id: String,
    pub chapter_number: Option<i64>,
    pub chapter_title: Option<String>,
    pub existing_questions: u64,
    pub inserted: u64,
    pub total_now: u64,
}

/// The embedded sample: a chapter plus candidate questions without a
/// `chapter_id`, which is filled in at insert time.
#[derive(Debug, Clone)]
pub struct SampleContent {
    pub chapter: Chapter,
    pub questions: Vec<Value>,
}

#[derive(Deserialize)]
struct RawSample {
    chapter: Value,
    questions: Vec<Value>,
}

impl SampleContent {
    pub fn load() -> Result<Self, SeedError> {
        let raw: RawSample = serde_json::from_str(SAMPLE_CONTENT)?;
        let chapter = Chapter::from_value(&raw.chapter)?;
        if chapter.number != SAMPLE_CHAPTER_NUMBER {
            return Err(SeedError::InvalidSample(format!(
                "sample chapter has number {}, expected {}",
                chapter.number, SAMPLE_CHAPTER_NUMBER
            )));
        }
        Ok(Self { chapter, questions: raw.questions })
    }

    /// Candidate question `index`, attached to `chapter_id` and validated.
    pub fn question_for(&self, index: usize, chapter_id: &str) -> Result<QuizQuestion, SeedError> {
        let mut value = self
            .questions
            .get(index)
            .cloned()
            .ok_or_else(|| SeedError::InvalidSample(format!("no sample question at {}", index)))?;
        match value.as_object_mut() {
            Some(obj) => {
                obj.insert("chapter_id".into(), Value::String(chapter_id.to_string()));
            }
            None => return Err(SeedError::InvalidSample(format!("sample question {} is not an object", index))),
        }
        Ok(QuizQuestion::from_value(&value)?)
    }
}

/// Ensure the sample chapter exists and has [`TARGET_QUESTION_COUNT`]
/// questions.
///
/// The chapter is keyed by its number, so it is never duplicated. Questions
/// are counted, then the first `target - existing` candidates are inserted.
/// Candidates are always taken from the head of the list, so a chapter that
/// already holds some of them gets those again. Count and insert are not
/// atomic; concurrent calls can overshoot the target.
pub async fn seed_sample(db: &DatabaseManager) -> Result<SeedReport, SeedError> {
    if !db.is_connected() {
        return Err(DatabaseError::StoreUnavailable.into());
    }

    let sample = SampleContent::load()?;

    let chapter_doc = match db
        .find_one(Chapter::COLLECTION, DocumentFilter::new().where_eq("number", SAMPLE_CHAPTER_NUMBER))
        .await?
    {
        Some(doc) => doc,
        None => {
            let id = db.create(Chapter::COLLECTION, &sample.chapter).await?;
            info!("Seeded sample chapter {}", id);
            let id = parse_id(&id)?;
            Document::from_entity(id, &sample.chapter)?
        }
    };
    let chapter_id = chapter_doc.id_string();

    let existing = db
        .count(
            QuizQuestion::COLLECTION,
            &DocumentFilter::new().where_eq("chapter_id", chapter_id.as_str()),
        )
        .await?;

    let to_insert = TARGET_QUESTION_COUNT.saturating_sub(existing) as usize;
    let mut inserted = 0u64;
    for index in 0..to_insert.min(sample.questions.len()) {
        let question = sample.question_for(index, &chapter_id)?;
        db.create(QuizQuestion::COLLECTION, &question).await?;
        inserted += 1;
    }

    info!(
        "Seed for chapter {}: {} existing, {} inserted",
        chapter_id, existing, inserted
    );

    Ok(SeedReport {
        chapter_id,
        chapter_number: chapter_doc.get_i64("number"),
        chapter_title: chapter_doc.get_str("title").map(str::to_string),
        existing_questions: existing,
        inserted,
        total_now: existing + inserted,
    })
}
