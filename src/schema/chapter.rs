use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::validation::{parse, ValidationError};

/// A chapter of the biology course. Stored in the `chapter` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Chapter {
    /// Ordering key, 1-based.
    #[validate(range(min = 1, message = "must be greater than or equal to 1"))]
    pub number: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub summary: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub reference: Option<String>,
    /// Conventionally `{title, content}` records; not checked below the object level.
    #[serde(default)]
    pub sections: Vec<Map<String, Value>>,
}

impl Chapter {
    pub const COLLECTION: &'static str = "chapter";

    /// Build a chapter from an untrusted payload. Unknown keys (including a
    /// client-sent `id`) are ignored.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_chapter_gets_defaults() {
        let ch = Chapter::from_value(&json!({
            "number": 2,
            "title": "Sel",
            "summary": "Struktur sel"
        }))
        .unwrap();
        assert_eq!(ch.number, 2);
        assert!(ch.objectives.is_empty());
        assert!(ch.sections.is_empty());
        assert_eq!(ch.reference, None);
    }

    #[test]
    fn rejects_non_positive_number() {
        let err = Chapter::from_value(&json!({ "number": 0, "title": "t", "summary": "s" })).unwrap_err();
        assert_eq!(err.field_errors["number"], "must be greater than or equal to 1");
    }

    #[test]
    fn reports_all_rule_violations() {
        let err = Chapter::from_value(&json!({
            "number": 0,
            "title": "",
            "summary": "",
            "objectives": []
        }))
        .unwrap_err();
        assert_eq!(err.field_errors["number"], "must be greater than or equal to 1");
        assert_eq!(err.field_errors["title"], "must not be empty");
        assert_eq!(err.field_errors["summary"], "must not be empty");
        assert_eq!(err.field_errors.len(), 3);
    }

    #[test]
    fn wrong_types_are_reported_on_body() {
        for payload in [
            json!({ "number": "one", "title": "t", "summary": "s" }),
            json!({ "number": 1, "summary": "s" }),
            json!({ "number": 1, "title": "t", "summary": "s", "objectives": "learn" }),
            json!({ "number": 1, "title": "t", "summary": "s", "sections": [{"title": "a"}, "b"] }),
        ] {
            let err = Chapter::from_value(&payload).unwrap_err();
            assert!(err.has_field("body"), "{}", payload);
        }
    }

    #[test]
    fn null_reference_is_accepted() {
        let ch = Chapter::from_value(&json!({
            "number": 1, "title": "t", "summary": "s", "reference": null, "id": "mine"
        }))
        .unwrap();
        assert_eq!(ch.reference, None);
    }

    #[test]
    fn serializes_to_stored_shape() {
        let ch = Chapter::from_value(&json!({
            "number": 1,
            "title": "t",
            "summary": "s",
            "objectives": ["o"],
            "sections": [{"title": "h", "content": "c"}]
        }))
        .unwrap();
        let v = serde_json::to_value(&ch).unwrap();
        assert_eq!(v["reference"], Value::Null);
        assert_eq!(v["sections"][0]["content"], "c");
        assert!(v.get("id").is_none());
    }
}
