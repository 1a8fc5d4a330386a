/// User service - validation and login state transitions over a `UserStore`
use roster_core::types::LOGGED_IN_FIELD;
use roster_core::validation::validate_candidate;
use roster_core::{Document, Filter, RosterError, StoreSession, User, UserStore};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UserError>;

/// Failures of a single user operation
#[derive(Debug, Error)]
pub enum UserError {
    /// Missing or empty required field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Username already taken
    #[error("Username already taken")]
    Conflict,

    /// No record matched the request
    #[error("User not found")]
    NotFound,

    /// The store rejected a call made within the session
    #[error("Store error: {0}")]
    Store(#[source] RosterError),

    /// No session could be acquired
    #[error("Store connection error: {0}")]
    Connection(#[source] RosterError),
}

/// Which way a login toggle went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDirection {
    In,
    Out,
}

impl LoginDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginDirection::In => "in",
            LoginDirection::Out => "out",
        }
    }
}

/// Result of a successful login toggle
#[derive(Debug, Clone)]
pub struct LoginToggle {
    pub user: User,
    pub direction: LoginDirection,
}

/// Stateless user operations
///
/// Each operation validates its input, opens one store session, and closes
/// that session before returning, whatever the outcome. Read-then-write
/// sequences (toggle, delete) are not atomic across sessions: two toggles
/// racing on one user may both observe the same prior state.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Look up a user by username
    pub async fn get_user(&self, username: &str) -> Result<User> {
        let mut session = self.open_session().await?;
        let result = find_user(session.as_mut(), &username_filter(username)).await;
        session.close().await;

        result?.ok_or(UserError::NotFound)
    }

    /// Create a user from a caller-supplied candidate
    ///
    /// The stored record always starts logged out.
    pub async fn create_user(&self, candidate: Option<&Value>) -> Result<User> {
        let candidate = validate(candidate)?;

        let mut session = self.open_session().await?;
        let result = insert_new_user(session.as_mut(), candidate).await;
        session.close().await;

        result
    }

    /// Flip the login state of the user matching the whole candidate
    ///
    /// Every supplied field takes part in the lookup, so extra fields narrow
    /// the match.
    pub async fn toggle_login(&self, candidate: Option<&Value>) -> Result<LoginToggle> {
        let candidate = validate(candidate)?;

        let mut session = self.open_session().await?;
        let result = flip_login(session.as_mut(), Filter::from(candidate)).await;
        session.close().await;

        result
    }

    /// Delete the user matching both username and password
    ///
    /// Returns the filter used for the deletion.
    pub async fn delete_user(&self, username: &str, password: &str) -> Result<Filter> {
        let filter = username_filter(username).with("password", password);

        let mut session = self.open_session().await?;
        let result = delete_matching(session.as_mut(), &filter).await;
        session.close().await;

        result.map(|()| filter)
    }

    async fn open_session(&self) -> Result<Box<dyn StoreSession>> {
        let session = self.store.connect().await.map_err(UserError::Connection)?;
        tracing::debug!("Store session opened");
        Ok(session)
    }
}

fn validate(candidate: Option<&Value>) -> Result<Document> {
    validate_candidate(candidate).map_err(|e| match e {
        RosterError::InvalidInput(msg) => UserError::InvalidInput(msg),
        other => UserError::Store(other),
    })
}

fn username_filter(username: &str) -> Filter {
    Filter::new().with("username", username)
}

async fn find_user(session: &mut dyn StoreSession, filter: &Filter) -> Result<Option<User>> {
    session
        .find_one(filter)
        .await
        .map_err(UserError::Store)?
        .map(decode)
        .transpose()
}

async fn insert_new_user(session: &mut dyn StoreSession, mut candidate: Document) -> Result<User> {
    let username = candidate.get("username").cloned().unwrap_or_default();
    let filter = Filter::new().with("username", username);

    if session
        .find_one(&filter)
        .await
        .map_err(UserError::Store)?
        .is_some()
    {
        return Err(UserError::Conflict);
    }

    candidate.insert(LOGGED_IN_FIELD.to_string(), Value::Bool(false));
    session
        .insert_one(&candidate)
        .await
        .map_err(UserError::Store)?;

    decode(candidate)
}

async fn flip_login(session: &mut dyn StoreSession, filter: Filter) -> Result<LoginToggle> {
    let Some(mut stored) = session.find_one(&filter).await.map_err(UserError::Store)? else {
        return Err(UserError::NotFound);
    };

    let logged_in = !stored
        .get(LOGGED_IN_FIELD)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut set = Document::new();
    set.insert(LOGGED_IN_FIELD.to_string(), Value::Bool(logged_in));

    let matched = session
        .update_one(&Filter::from(stored.clone()), &set)
        .await
        .map_err(UserError::Store)?;
    if matched == 0 {
        // Deleted between the read and the write
        return Err(UserError::NotFound);
    }

    stored.insert(LOGGED_IN_FIELD.to_string(), Value::Bool(logged_in));
    let direction = if logged_in {
        LoginDirection::In
    } else {
        LoginDirection::Out
    };

    Ok(LoginToggle {
        user: decode(stored)?,
        direction,
    })
}

async fn delete_matching(session: &mut dyn StoreSession, filter: &Filter) -> Result<()> {
    if session
        .find_one(filter)
        .await
        .map_err(UserError::Store)?
        .is_none()
    {
        return Err(UserError::NotFound);
    }

    session
        .delete_one(filter)
        .await
        .map_err(UserError::Store)?;
    Ok(())
}

fn decode(document: Document) -> Result<User> {
    User::from_document(document).map_err(UserError::Store)
}
