/// Document and filter types
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored record in its JSON object form
pub type Document = Map<String, Value>;

/// Field/value constraints selecting documents
///
/// A document matches when every field named by the filter is present in
/// the document with an equal value. Fields the filter does not name are
/// unconstrained, so an empty filter matches any document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Document);

impl Filter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality constraint on `field`
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Check whether `document` satisfies every constraint
    pub fn matches(&self, document: &Document) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// The constrained `username`, when it is a string
    pub fn username(&self) -> Option<&str> {
        self.0.get("username").and_then(Value::as_str)
    }

    /// Unwrap the constraints as a document
    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for Filter {
    fn from(document: Document) -> Self {
        Self(document)
    }
}
