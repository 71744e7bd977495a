//! Model trait for typed documents
//!
//! A model is a plain serde struct with an explicit identifier accessor. The
//! identifier is stored under `_id`; every other serialized field becomes a
//! document field.

use bson::{Bson, Document as BsonDocument};
use serde::{de::DeserializeOwned, Serialize};

use crate::object_id::{id_to_bson, IdKind};
use crate::row::Row;
use crate::Result;

/// Field name of the document identifier
pub const ID_FIELD: &str = "_id";

/// Core trait for mapped models
///
/// # Example
///
/// ```ignore
/// use serde::{Deserialize, Serialize};
/// use docstorm_mongodb::Model;
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct User {
///     #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
///     id: String,
///     firstname: String,
///     lastname: String,
/// }
///
/// impl Model for User {
///     fn collection_name() -> &'static str {
///         "users"
///     }
///
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: String) {
///         self.id = id;
///     }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Default + Send + Sync {
    /// Collection this model is stored in
    fn collection_name() -> &'static str;

    /// The identifier, empty when not yet assigned
    fn id(&self) -> &str;

    /// Assign the identifier
    fn set_id(&mut self, id: String);

    /// How the identifier is stored in `_id`
    fn id_kind() -> IdKind {
        IdKind::Auto
    }

    /// Serialize the model's fields, without `_id`
    fn to_document(&self) -> Result<BsonDocument> {
        let mut doc = bson::to_document(self)?;
        doc.remove(ID_FIELD);
        Ok(doc)
    }

    /// Build a model from a result row
    fn from_row(row: &Row) -> Result<Self> {
        Ok(serde_json::from_value(row.to_json())?)
    }

    /// True if no identifier has been assigned
    fn key_is_empty(&self) -> bool {
        self.id().is_empty()
    }

    /// The `_id` value for this model's identifier, if any
    fn id_bson(&self) -> Result<Option<Bson>> {
        if self.key_is_empty() {
            return Ok(None);
        }
        id_to_bson(self.id(), Self::id_kind()).map(Some)
    }
}
