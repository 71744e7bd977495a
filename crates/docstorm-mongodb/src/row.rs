//! Generic row representation of query results.
//!
//! Each result document is converted to relaxed extended JSON, with ObjectIds
//! unwrapped to bare hex strings, before a model reads its fields from it.

use bson::{Bson, Document as BsonDocument};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

use crate::cursor::Cursor;
use crate::object_id::unwrap_object_ids;
use crate::{Result, StormError};

/// A single parsed result document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Field name to value mapping
    pub data: Map<String, JsonValue>,
}

impl Row {
    /// Creates a row from a field map.
    pub fn new(data: Map<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Parses a driver document into a row.
    pub fn from_document(doc: BsonDocument) -> Result<Self> {
        match unwrap_object_ids(Bson::Document(doc).into_relaxed_extjson()) {
            JsonValue::Object(data) => Ok(Self { data }),
            other => Err(StormError::Deserialization(format!(
                "Expected a document, got {}",
                other
            ))),
        }
    }

    /// Gets a raw value by field name.
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.data.get(field)
    }

    /// The `_id` field as a string, or empty if absent.
    pub fn id(&self) -> String {
        match self.data.get("_id") {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Gets a string field, or empty if absent or not a string.
    pub fn get_str(&self, field: &str) -> String {
        self.data
            .get(field)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Gets an integer field.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.data.get(field).and_then(JsonValue::as_i64)
    }

    /// Gets a floating point field.
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.data.get(field).and_then(JsonValue::as_f64)
    }

    /// Gets a boolean field.
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.data.get(field).and_then(JsonValue::as_bool)
    }

    /// Gets an array of strings, skipping non-string elements.
    pub fn get_string_vec(&self, field: &str) -> Vec<String> {
        self.data
            .get(field)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Gets a string-to-string map, skipping non-string values.
    pub fn get_string_map(&self, field: &str) -> HashMap<String, String> {
        self.data
            .get(field)
            .and_then(JsonValue::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Converts the row into a JSON object.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.data.clone())
    }
}

/// Parses every driver document into a row.
pub fn parse_rows(docs: Vec<BsonDocument>) -> Result<Vec<Row>> {
    docs.into_iter().map(Row::from_document).collect()
}

/// Rows of the last query together with the cursor that produced them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub rows: Vec<Row>,
    pub cursor: Cursor,
}

impl ResultSet {
    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the last query returned nothing.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
