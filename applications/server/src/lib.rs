//! Roster Server Library
//!
//! HTTP service over the Roster users collection: lookup, creation, login
//! toggling and deletion of user records.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::{UserError, UserService};
pub use state::AppState;
