//! `SQLite`-backed users collection
//!
//! Documents are stored as JSON text, one row each. Lookups that constrain
//! `username` go through the unique expression index; any other filter
//! scans the table. The remaining constraints are checked on the decoded
//! document.

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use roster_core::{Document, Filter, StoreSession, UserStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use std::time::Duration;

/// Users collection in a `SQLite` database
///
/// Holds only connection options; each [`UserStore::connect`] call opens a
/// dedicated connection that lives exactly as long as its session.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    options: SqliteConnectOptions,
}

impl SqliteUserStore {
    /// Prepare the database at `database_url` and run migrations
    ///
    /// # Arguments
    ///
    /// * `database_url` - `SQLite` connection string (e.g., `<sqlite://roster.db>`)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the database cannot be opened
    /// or migrations fail
    pub async fn open(database_url: &str) -> Result<Self> {
        tracing::debug!("Opening SQLite user store at {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        // SQLite creates the file but not its directory
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let store = Self { options };

        let mut conn = store.open_connection().await?;
        crate::run_migrations(&mut conn).await?;
        conn.close().await?;

        tracing::info!("SQLite user store ready");
        Ok(store)
    }

    async fn open_connection(&self) -> Result<SqliteConnection> {
        self.options
            .connect()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn connect(&self) -> roster_core::Result<Box<dyn StoreSession>> {
        let conn = self.open_connection().await?;
        tracing::debug!("SQLite session opened");
        Ok(Box::new(SqliteSession { conn }))
    }
}

struct SqliteSession {
    conn: SqliteConnection,
}

impl SqliteSession {
    /// Row id and body of the first document matching `filter`
    async fn find_row(&mut self, filter: &Filter) -> Result<Option<(i64, Document)>> {
        let rows: Vec<(i64, String)> = match filter.username() {
            Some(username) => {
                sqlx::query_as(
                    "SELECT id, document FROM user_documents
                     WHERE json_extract(document, '$.username') = ?
                     ORDER BY id",
                )
                .bind(username)
                .fetch_all(&mut self.conn)
                .await?
            }
            None => {
                sqlx::query_as("SELECT id, document FROM user_documents ORDER BY id")
                    .fetch_all(&mut self.conn)
                    .await?
            }
        };

        for (id, raw) in rows {
            let document: Document = serde_json::from_str(&raw)?;
            if filter.matches(&document) {
                return Ok(Some((id, document)));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl StoreSession for SqliteSession {
    async fn find_one(&mut self, filter: &Filter) -> roster_core::Result<Option<Document>> {
        Ok(self.find_row(filter).await?.map(|(_, document)| document))
    }

    async fn insert_one(&mut self, document: &Document) -> roster_core::Result<()> {
        let raw = serde_json::to_string(document)?;

        sqlx::query("INSERT INTO user_documents (document) VALUES (?)")
            .bind(raw)
            .execute(&mut self.conn)
            .await?;

        Ok(())
    }

    async fn update_one(&mut self, filter: &Filter, set: &Document) -> roster_core::Result<u64> {
        let Some((id, mut document)) = self.find_row(filter).await? else {
            return Ok(0);
        };

        for (field, value) in set {
            document.insert(field.clone(), value.clone());
        }
        let raw = serde_json::to_string(&document)?;

        let result = sqlx::query("UPDATE user_documents SET document = ? WHERE id = ?")
            .bind(raw)
            .bind(id)
            .execute(&mut self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_one(&mut self, filter: &Filter) -> roster_core::Result<u64> {
        let Some((id, _)) = self.find_row(filter).await? else {
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM user_documents WHERE id = ?")
            .bind(id)
            .execute(&mut self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn close(self: Box<Self>) {
        match self.conn.close().await {
            Ok(()) => tracing::debug!("SQLite session closed"),
            Err(e) => tracing::warn!("Failed to close SQLite session cleanly: {}", e),
        }
    }
}
