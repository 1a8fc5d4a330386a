//! In-memory users collection

use async_trait::async_trait;
use roster_core::{Document, Filter, RosterError, StoreSession, UserStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-local users collection
///
/// Clones share the same documents. Session bookkeeping is exposed so
/// callers can check that every session they opened was released.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: Mutex<Vec<Document>>,
    opened: AtomicUsize,
    live: AtomicUsize,
}

impl MemoryUserStore {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions handed out so far
    pub fn opened_sessions(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions not yet closed or dropped
    pub fn live_sessions(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored document, in insertion order
    pub async fn documents(&self) -> Vec<Document> {
        self.inner.documents.lock().await.clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn connect(&self) -> roster_core::Result<Box<dyn StoreSession>> {
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        self.inner.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct MemorySession {
    inner: Arc<Inner>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.inner.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn find_one(&mut self, filter: &Filter) -> roster_core::Result<Option<Document>> {
        let documents = self.inner.documents.lock().await;
        Ok(documents.iter().find(|d| filter.matches(d)).cloned())
    }

    async fn insert_one(&mut self, document: &Document) -> roster_core::Result<()> {
        let mut documents = self.inner.documents.lock().await;

        // Same uniqueness rule the SQLite index enforces
        if let Some(username) = document.get("username") {
            if documents.iter().any(|d| d.get("username") == Some(username)) {
                return Err(RosterError::store(format!(
                    "duplicate username: {username}"
                )));
            }
        }

        documents.push(document.clone());
        Ok(())
    }

    async fn update_one(&mut self, filter: &Filter, set: &Document) -> roster_core::Result<u64> {
        let mut documents = self.inner.documents.lock().await;
        let Some(document) = documents.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(0);
        };

        for (field, value) in set {
            document.insert(field.clone(), value.clone());
        }
        Ok(1)
    }

    async fn delete_one(&mut self, filter: &Filter) -> roster_core::Result<u64> {
        let mut documents = self.inner.documents.lock().await;
        match documents.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn close(self: Box<Self>) {
        tracing::debug!("Memory session closed");
    }
}
