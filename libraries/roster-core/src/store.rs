//! Store traits for the users collection

use crate::error::Result;
use crate::types::{Document, Filter};
use async_trait::async_trait;

/// A users collection that hands out request-scoped sessions
///
/// Implementations open a fresh session per call; nothing is shared
/// between sessions except the persisted documents themselves.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Acquire a new session
    async fn connect(&self) -> Result<Box<dyn StoreSession>>;
}

/// One acquired connection to the users collection
///
/// Each call is atomic on its own. Sequences of calls are not: a
/// `find_one` followed by `update_one` can interleave with other sessions.
///
/// Dropping a session releases it. `close` does the same but lets the
/// store finish any shutdown work first.
#[async_trait]
pub trait StoreSession: Send {
    /// First document matching `filter`, in insertion order
    async fn find_one(&mut self, filter: &Filter) -> Result<Option<Document>>;

    /// Persist a new document
    async fn insert_one(&mut self, document: &Document) -> Result<()>;

    /// Overwrite the `set` fields on the first document matching `filter`
    ///
    /// Returns the number of matched documents (0 or 1).
    async fn update_one(&mut self, filter: &Filter, set: &Document) -> Result<u64>;

    /// Remove the first document matching `filter`
    ///
    /// Returns the number of deleted documents (0 or 1).
    async fn delete_one(&mut self, filter: &Filter) -> Result<u64>;

    /// Release the session
    async fn close(self: Box<Self>);
}
