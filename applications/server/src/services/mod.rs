/// Server services
pub mod users;

pub use users::{LoginDirection, LoginToggle, UserError, UserService};
