//! Identifier handling: ObjectId recognition, generation and normalization
//!
//! A record identifier is either a 24-character lowercase-hex ObjectId or an
//! arbitrary opaque string such as a UUID. The two are told apart by format,
//! subject to the per-model [`IdKind`] policy.

use bson::{oid::ObjectId, Bson};
use serde_json::Value as JsonValue;

use crate::{Result, StormError};

/// Length of an ObjectId rendered as hex
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// How a model's identifier is stored in the `_id` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdKind {
    /// Valid 24-char lowercase hex ids become ObjectIds, anything else is a string
    #[default]
    Auto,
    /// Always an ObjectId; non-hex ids are rejected
    ObjectId,
    /// Always an opaque string, even when it looks like an ObjectId
    String,
}

/// Returns true iff `value` is exactly 24 characters of `[0-9a-f]`.
///
/// Uppercase hex is rejected.
pub fn is_valid_object_id(value: &str) -> bool {
    value.len() == OBJECT_ID_HEX_LEN
        && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Generates a new ObjectId rendered as 24 lowercase hex characters
pub fn new_object_id() -> String {
    ObjectId::new().to_hex()
}

/// Generates a new random UUID in lowercase hyphenated form
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

/// Converts an identifier string into the BSON value stored under `_id`
pub fn id_to_bson(id: &str, kind: IdKind) -> Result<Bson> {
    match kind {
        IdKind::Auto if is_valid_object_id(id) => Ok(Bson::ObjectId(ObjectId::parse_str(id)?)),
        IdKind::Auto | IdKind::String => Ok(Bson::String(id.to_string())),
        IdKind::ObjectId => {
            if !is_valid_object_id(id) {
                return Err(StormError::Validation(format!(
                    "'{}' is not a 24-character lowercase hex ObjectId",
                    id
                )));
            }
            Ok(Bson::ObjectId(ObjectId::parse_str(id)?))
        }
    }
}

/// Renders a stored `_id` back into the identifier string a model holds
pub fn bson_to_id(value: &Bson) -> String {
    match value {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replaces every `{"$oid": "<hex>"}` object with the bare hex string
pub fn unwrap_object_ids(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            if map.len() == 1 {
                if let Some(JsonValue::String(hex)) = map.get("$oid") {
                    return JsonValue::String(hex.clone());
                }
            }
            JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, unwrap_object_ids(v)))
                    .collect(),
            )
        }
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(unwrap_object_ids).collect())
        }
        other => other,
    }
}
