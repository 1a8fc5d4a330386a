/// API route modules
pub mod health;
pub mod users;

use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

/// Build the service router
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/user", post(users::create_user))
        .route(
            "/user/flipLogIn",
            get(users::get_flip_login_user).patch(users::flip_login),
        )
        .route("/user/:username", get(users::get_user))
        .route("/user/:username/:password", delete(users::delete_user))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(app_state)
}
