use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Every field that failed validation, keyed by its path in the payload
/// (`title`, `questions[2].options`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .field_errors.len())]
pub struct ValidationError {
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), message.into());
        Self { field_errors }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    fn collect(&mut self, prefix: &str, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };
            match kind {
                ValidationErrorsKind::Field(failures) => {
                    if let Some(failure) = failures.first() {
                        let message = failure
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| failure.code.to_string());
                        self.field_errors.insert(path, message);
                    }
                }
                ValidationErrorsKind::Struct(nested) => self.collect(&path, nested),
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(&format!("{}[{}]", path, index), nested);
                    }
                }
            }
        }
    }
}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = ValidationError::default();
        out.collect("", &errors);
        out
    }
}

/// Shape errors (missing keys, wrong JSON types) stop deserialization at the
/// first problem, so they are reported against the whole body.
impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::single("body", err.to_string())
    }
}

/// Deserialize an untrusted payload, then apply the type's declared rules.
pub fn parse<T>(value: &Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let entity = T::deserialize(value)?;
    entity.validate()?;
    Ok(entity)
}
