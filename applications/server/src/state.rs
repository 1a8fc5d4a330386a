/// Shared application state
use crate::services::UserService;
use roster_core::UserStore;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            users: Arc::new(UserService::new(store)),
        }
    }
}
