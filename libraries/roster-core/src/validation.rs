//! Presence checks for incoming user candidates
//!
//! A candidate is the `user` object a caller sends when creating a user or
//! toggling its login state. Only presence is checked: `username` and
//! `password` must be non-empty strings. Every other field passes through.

use crate::error::{Result, RosterError};
use crate::types::Document;
use serde_json::Value;

/// Message when the payload carries no `user` object
pub const MISSING_USER: &str = "user object cannot be found";

/// Message when `username` is missing, null or empty
pub const MISSING_USERNAME: &str = "null or empty username field";

/// Message when `password` is missing, null or empty
pub const MISSING_PASSWORD: &str = "null or empty password field";

/// Validate a candidate and return it as a document
///
/// Only an absent candidate or a falsy scalar (`null`, `false`, `0`, `""`)
/// counts as a missing user object. Any other non-object value has no
/// `username` and reports the username message. The username check runs
/// before the password check, so a candidate missing both reports the
/// username message.
///
/// # Errors
///
/// Returns `RosterError::InvalidInput` with one of the fixed messages above.
pub fn validate_candidate(candidate: Option<&Value>) -> Result<Document> {
    let document = match candidate {
        Some(Value::Object(document)) => document,
        Some(value) if !is_falsy(value) => {
            return Err(RosterError::invalid_input(MISSING_USERNAME));
        }
        _ => return Err(RosterError::invalid_input(MISSING_USER)),
    };

    if !is_present(document.get("username")) {
        return Err(RosterError::invalid_input(MISSING_USERNAME));
    }
    if !is_present(document.get("password")) {
        return Err(RosterError::invalid_input(MISSING_PASSWORD));
    }

    Ok(document.clone())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.is_empty())
}
