/// Common test utilities and fixtures
use async_trait::async_trait;
use roster_core::{Document, Filter, RosterError, StoreSession, UserStore};
use roster_storage::{MemoryUserStore, SqliteUserStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a `SQLite` store in a temporary directory
///
/// The directory is removed when the returned `TempDir` is dropped.
pub async fn create_test_store() -> (SqliteUserStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", temp_dir.path().join("roster.db").display());
    let store = SqliteUserStore::open(&db_url).await.unwrap();
    (store, temp_dir)
}

/// Store whose sessions fail on a chosen call
///
/// Wraps a `MemoryUserStore` so successful calls still see real data.
#[derive(Clone)]
pub struct FailingStore {
    pub inner: MemoryUserStore,
    pub fail_on: FailOn,
    pub closed: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Connect,
    Find,
    Insert,
    Update,
    Delete,
}

impl FailingStore {
    pub fn new(inner: MemoryUserStore, fail_on: FailOn) -> Self {
        Self {
            inner,
            fail_on,
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn closed_sessions(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for FailingStore {
    async fn connect(&self) -> roster_core::Result<Box<dyn StoreSession>> {
        if self.fail_on == FailOn::Connect {
            return Err(RosterError::store("connection refused"));
        }
        Ok(Box::new(FailingSession {
            inner: self.inner.connect().await?,
            fail_on: self.fail_on,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct FailingSession {
    inner: Box<dyn StoreSession>,
    fail_on: FailOn,
    closed: Arc<AtomicUsize>,
}

impl FailingSession {
    fn check(&self, call: FailOn) -> roster_core::Result<()> {
        if self.fail_on == call {
            Err(RosterError::store(format!("injected {call:?} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StoreSession for FailingSession {
    async fn find_one(&mut self, filter: &Filter) -> roster_core::Result<Option<Document>> {
        self.check(FailOn::Find)?;
        self.inner.find_one(filter).await
    }

    async fn insert_one(&mut self, document: &Document) -> roster_core::Result<()> {
        self.check(FailOn::Insert)?;
        self.inner.insert_one(document).await
    }

    async fn update_one(&mut self, filter: &Filter, set: &Document) -> roster_core::Result<u64> {
        self.check(FailOn::Update)?;
        self.inner.update_one(filter, set).await
    }

    async fn delete_one(&mut self, filter: &Filter) -> roster_core::Result<u64> {
        self.check(FailOn::Delete)?;
        self.inner.delete_one(filter).await
    }

    async fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await;
    }
}

/// Test user credentials
pub mod fixtures {
    pub const TEST_USERNAME: &str = "alice";
    pub const TEST_PASSWORD: &str = "pw1";
}
