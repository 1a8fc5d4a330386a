//! Roster Storage
//!
//! Document storage for the Roster users collection.
//!
//! Two `UserStore` implementations are provided:
//!
//! - [`SqliteUserStore`]: JSON documents in a `SQLite` table. Every session
//!   opens its own connection and closes it when the session ends.
//! - [`MemoryUserStore`]: a process-local collection, used by tests and
//!   throwaway runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use roster_core::{Filter, UserStore};
//! use roster_storage::SqliteUserStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteUserStore::open("sqlite://roster.db").await?;
//!
//! let mut session = store.connect().await?;
//! let alice = session.find_one(&Filter::new().with("username", "alice")).await?;
//! session.close().await;
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod sqlite;

pub use error::StorageError;
pub use memory::MemoryUserStore;
pub use sqlite::SqliteUserStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqliteConnection;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations on an open connection
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(conn).await
}
