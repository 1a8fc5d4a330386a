mod document;
mod user;

pub use document::{Document, Filter};
pub use user::{User, LOGGED_IN_FIELD};
