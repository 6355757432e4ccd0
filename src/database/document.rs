use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// A stored document: the store-assigned identifier plus the entity's fields.
/// The identifier is kept out of `fields`; it only becomes a field at the
/// response boundary (see `api::format`).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: Uuid, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Serialize an entity into document form under the given identifier.
    pub fn from_entity<T: Serialize>(id: Uuid, entity: &T) -> Result<Self, DatabaseError> {
        Ok(Self::new(id, to_fields(entity)?))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    /// Identifier in its public string form.
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }
}

/// Parse a public identifier. Anything that is not a UUID is rejected here,
/// before any lookup happens.
pub fn parse_id(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|_| DatabaseError::InvalidIdentifier(raw.to_string()))
}

/// Entities must serialize to a JSON object. Any `id` key is dropped since
/// the store owns identifiers.
pub fn to_fields<T: Serialize>(entity: &T) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::to_value(entity)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(DatabaseError::QueryError(format!(
            "document must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
