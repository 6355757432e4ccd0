use serde_json::{Map, Value};

use crate::database::Document;

/// Public wire form of a stored document: its fields plus `id` as a string.
pub fn document_to_api_value(document: Document) -> Value {
    let mut obj = Map::with_capacity(document.fields.len() + 1);
    obj.insert("id".into(), Value::String(document.id.to_string()));
    for (key, value) in document.fields {
        if key != "id" {
            obj.insert(key, value);
        }
    }
    Value::Object(obj)
}

pub fn documents_to_api_array(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(document_to_api_value).collect())
}
