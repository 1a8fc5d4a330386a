/// Users API routes
use crate::{
    error::{Result, ServerError},
    services::UserError,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use roster_core::{Filter, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /user` and `PATCH /user/flipLogIn`
#[derive(Debug, Default, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub user: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserMessageResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
    #[serde(rename = "deletedUser")]
    pub deleted_user: Filter,
}

pub const USERNAME_TAKEN: &str = "The requested username is already taken";

/// Literal path segment of the toggle route
pub const FLIP_LOGIN_SEGMENT: &str = "flipLogIn";

/// GET /user/:username
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>> {
    lookup_user(&app_state, &username).await
}

/// GET /user/flipLogIn
///
/// The flip route's literal segment shadows `:username` for every method,
/// so a user named `flipLogIn` is looked up here.
pub async fn get_flip_login_user(State(app_state): State<AppState>) -> Result<Json<UserResponse>> {
    lookup_user(&app_state, FLIP_LOGIN_SEGMENT).await
}

async fn lookup_user(app_state: &AppState, username: &str) -> Result<Json<UserResponse>> {
    let user = app_state.users.get_user(username).await.map_err(|e| {
        to_server_error(
            e,
            Some(ServerError::NotFound("the requested user does not exist".to_string())),
            ServerError::BadRequest("An error occurred trying to retrieve data".to_string()),
        )
    })?;

    Ok(Json(UserResponse { user }))
}

/// POST /user
///
/// A missing or malformed body is treated like a body without `user`.
pub async fn create_user(
    State(app_state): State<AppState>,
    body: Option<Json<UserRequest>>,
) -> Result<Json<UserMessageResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let user = app_state
        .users
        .create_user(req.user.as_ref())
        .await
        .map_err(|e| {
            to_server_error(
                e,
                None,
                ServerError::Unprocessable(
                    "An error occurred attempting to insert data".to_string(),
                ),
            )
        })?;

    Ok(Json(UserMessageResponse {
        message: "user added successfully".to_string(),
        user,
    }))
}

/// PATCH /user/flipLogIn
pub async fn flip_login(
    State(app_state): State<AppState>,
    body: Option<Json<UserRequest>>,
) -> Result<Json<UserMessageResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let toggle = app_state
        .users
        .toggle_login(req.user.as_ref())
        .await
        .map_err(|e| {
            to_server_error(
                e,
                Some(ServerError::BadRequest("The requested user does not exist".to_string())),
                ServerError::Unprocessable("An error occurred attempting to edit data".to_string()),
            )
        })?;

    Ok(Json(UserMessageResponse {
        message: format!("user successfully logged {}", toggle.direction.as_str()),
        user: toggle.user,
    }))
}

/// DELETE /user/:username/:password
///
/// Responds 204 with a JSON body. HTTP servers drop bodies on 204, so
/// callers on the wire only see the status.
pub async fn delete_user(
    State(app_state): State<AppState>,
    Path((username, password)): Path<(String, String)>,
) -> Result<(StatusCode, Json<DeleteUserResponse>)> {
    let deleted_user = app_state
        .users
        .delete_user(&username, &password)
        .await
        .map_err(|e| {
            to_server_error(
                e,
                Some(ServerError::NotFound(
                    "The requested user to delete was not found. \
                     Ensure that username and password are correct"
                        .to_string(),
                )),
                ServerError::BadRequest("An error occurred attempting to delete data".to_string()),
            )
        })?;

    Ok((
        StatusCode::NO_CONTENT,
        Json(DeleteUserResponse {
            message: "user deleted successfully".to_string(),
            deleted_user,
        }),
    ))
}

/// Map a service failure onto the route's fixed responses
///
/// Store and connection details are logged here and never reach the caller.
/// Routes with no not-found outcome pass `None`; a `NotFound` reaching them
/// is reported as the route's store failure.
fn to_server_error(
    err: UserError,
    not_found: Option<ServerError>,
    store_failure: ServerError,
) -> ServerError {
    match err {
        UserError::InvalidInput(msg) => ServerError::BadRequest(msg),
        UserError::Conflict => ServerError::BadRequest(USERNAME_TAKEN.to_string()),
        UserError::NotFound => match not_found {
            Some(not_found) => not_found,
            None => {
                tracing::error!("Unexpected not-found outcome");
                store_failure
            }
        },
        UserError::Store(e) => {
            tracing::error!("Store error: {:?}", e);
            store_failure
        }
        UserError::Connection(e) => {
            tracing::error!("Store connection error: {:?}", e);
            ServerError::Connection
        }
    }
}
