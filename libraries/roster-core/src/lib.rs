//! Roster Core
//!
//! Storage-agnostic types, validation rules and store traits for the Roster
//! users service.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Document`, `Filter`
//! - **Validation**: presence checks applied to incoming user candidates
//! - **Core Traits**: `UserStore` and `StoreSession`
//! - **Error Handling**: Unified `RosterError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use roster_core::validation::validate_candidate;
//! use roster_core::Filter;
//! use serde_json::json;
//!
//! let payload = json!({ "username": "alice", "password": "pw1" });
//! let candidate = validate_candidate(Some(&payload)).unwrap();
//!
//! let filter = Filter::from(candidate.clone());
//! assert!(filter.matches(&candidate));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod types;
pub mod validation;

pub use error::{Result, RosterError};
pub use store::{StoreSession, UserStore};
pub use types::{Document, Filter, User};
