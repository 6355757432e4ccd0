pub mod error;

use serde_json::{Map, Value};

pub use error::FilterError;

/// Equality filter over top-level document fields, optionally capped.
///
/// On Postgres the conditions become a single JSONB containment test, so
/// `number == 1` does not match a stored `"1"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    conditions: Map<String, Value>,
    limit: Option<usize>,
}

/// Rendered statement. `$1` is always the containment document; `$2` is the
/// limit when one is set.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub query: String,
    pub containment: Value,
    pub limit: Option<i64>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for field in self.conditions.keys() {
            if !is_identifier(field) {
                return Err(FilterError::InvalidField(field.clone()));
            }
        }
        Ok(())
    }

    /// True when every condition equals the document's field of the same name.
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        self.conditions
            .iter()
            .all(|(k, expected)| fields.get(k) == Some(expected))
    }

    pub fn to_select_sql(&self, collection: &str) -> Result<SqlQuery, FilterError> {
        validate_collection_name(collection)?;
        self.validate()?;

        let mut query = format!(
            "SELECT id, data FROM \"{}\" WHERE data @> $1 ORDER BY seq",
            collection
        );
        if self.limit.is_some() {
            query.push_str(" LIMIT $2");
        }

        Ok(SqlQuery {
            query,
            containment: Value::Object(self.conditions.clone()),
            limit: self.limit.map(|l| l.min(i64::MAX as usize) as i64),
        })
    }

    pub fn to_count_sql(&self, collection: &str) -> Result<SqlQuery, FilterError> {
        validate_collection_name(collection)?;
        self.validate()?;

        Ok(SqlQuery {
            query: format!(
                "SELECT COUNT(*) AS count FROM \"{}\" WHERE data @> $1",
                collection
            ),
            containment: Value::Object(self.conditions.clone()),
            limit: None,
        })
    }
}

/// Collection names become table names, so they are restricted to
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_collection_name(name: &str) -> Result<(), FilterError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(FilterError::InvalidCollection(name.to_string()))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
