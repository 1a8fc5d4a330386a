/// User domain type
use super::Document;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field holding the login flag in stored documents
pub const LOGGED_IN_FIELD: &str = "isLoggedIn";

/// User record
///
/// Fields other than the three known ones are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique key within the store
    pub username: String,

    /// Plaintext password
    pub password: String,

    /// Login state, `false` until the first toggle
    #[serde(rename = "isLoggedIn", default)]
    pub is_logged_in: bool,

    /// Caller-supplied fields persisted as-is
    #[serde(flatten)]
    pub extra: Document,
}

impl User {
    /// Create a logged-out user with no extra fields
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_logged_in: false,
            extra: Document::new(),
        }
    }

    /// Decode a stored document
    pub fn from_document(document: Document) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(document))?)
    }

    /// Encode into the stored document form
    pub fn into_document(self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct always serializes to an object
            other => Err(crate::RosterError::store(format!(
                "user encoded as non-object: {other}"
            ))),
        }
    }
}
