//! Name validation for collections and databases
//!
//! Collection and database names reach the driver from model definitions and
//! configuration. They are checked before a handle is opened so a bad name
//! fails early with a validation error instead of a server error.

use crate::{Result, StormError};

/// Maximum allowed length for collection names (MongoDB limit is 255, we're more conservative)
const MAX_COLLECTION_NAME_LENGTH: usize = 120;

/// Maximum allowed length for database names
const MAX_DATABASE_NAME_LENGTH: usize = 64;

/// Characters MongoDB forbids in database names
const DATABASE_NAME_FORBIDDEN: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

/// Validated collection name
///
/// # Guarantees
/// - Not empty
/// - Maximum 120 characters
/// - No null bytes
/// - No "system." prefix (system collections)
/// - No $ characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCollectionName {
    name: String,
}

impl ValidatedCollectionName {
    /// Creates a new validated collection name
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(StormError::Validation(
                "Collection name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_COLLECTION_NAME_LENGTH {
            return Err(StormError::Validation(format!(
                "Collection name exceeds maximum length of {} characters: '{}'",
                MAX_COLLECTION_NAME_LENGTH, name
            )));
        }

        if name.contains('\0') {
            return Err(StormError::Validation(
                "Collection name cannot contain null bytes".to_string(),
            ));
        }

        if name.starts_with("system.") {
            return Err(StormError::Validation(format!(
                "Collection name cannot start with 'system.' (reserved): '{}'",
                name
            )));
        }

        if name.contains('$') {
            return Err(StormError::Validation(format!(
                "Collection name cannot contain '$' character: '{}'",
                name
            )));
        }

        if name.contains("..") {
            tracing::warn!(collection = name, "Collection name contains suspicious pattern");
        }

        Ok(ValidatedCollectionName {
            name: name.to_string(),
        })
    }

    /// Returns the validated collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ValidatedCollectionName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedCollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Checks a database name against MongoDB's naming rules
pub fn validate_database_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StormError::Validation(
            "No database specified: set a default database or use with_database".to_string(),
        ));
    }

    if name.len() > MAX_DATABASE_NAME_LENGTH {
        return Err(StormError::Validation(format!(
            "Database name exceeds maximum length of {} characters: '{}'",
            MAX_DATABASE_NAME_LENGTH, name
        )));
    }

    if let Some(c) = name.chars().find(|c| DATABASE_NAME_FORBIDDEN.contains(c)) {
        return Err(StormError::Validation(format!(
            "Database name cannot contain {:?}: '{}'",
            c, name
        )));
    }

    Ok(())
}
