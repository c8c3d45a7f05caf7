use std::sync::Arc;

use axum::extract::FromRef;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    auth::password::PasswordEncoder,
    error::AppError,
    state::AppState,
    users::{User, UserStore},
};

/// Granted permission. There is no role model, so none are ever issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority(pub String);

/// What the login check needs to know about an account.
pub trait UserDetails {
    fn username(&self) -> &str;
    /// Stored password hash.
    fn password(&self) -> &str;
    fn authorities(&self) -> &[Authority] {
        &[]
    }
    fn is_account_non_expired(&self) -> bool {
        true
    }
    fn is_account_non_locked(&self) -> bool {
        true
    }
    fn is_credentials_non_expired(&self) -> bool {
        true
    }
    fn is_enabled(&self) -> bool {
        true
    }
}

impl UserDetails for User {
    fn username(&self) -> &str {
        &self.username
    }

    fn password(&self) -> &str {
        &self.password
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("user '{0}' not found")]
    UserNotFound(String),
    #[error("bad credentials")]
    BadCredentials,
    #[error("account expired")]
    AccountExpired,
    #[error("account locked")]
    Locked,
    #[error("credentials expired")]
    CredentialsExpired,
    #[error("account disabled")]
    Disabled,
    #[error("user store unavailable: {0}")]
    Store(#[from] AppError),
}

/// Looks users up by name and checks submitted passwords against them.
#[derive(Clone)]
pub struct AuthenticationProvider {
    users: Arc<dyn UserStore>,
    encoder: PasswordEncoder,
}

impl FromRef<AppState> for AuthenticationProvider {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.encoder.clone())
    }
}

impl AuthenticationProvider {
    pub fn new(users: Arc<dyn UserStore>, encoder: PasswordEncoder) -> Self {
        Self { users, encoder }
    }

    #[instrument(skip(self))]
    pub async fn load_user_by_username(&self, username: &str) -> Result<User, AuthError> {
        debug!("loading user");
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.load_user_by_username(username).await {
            Ok(u) => u,
            Err(e @ AuthError::UserNotFound(_)) => {
                self.encoder.verify_decoy(password);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        check_account_status(&user)?;

        if !self.encoder.verify(password, user.password()) {
            return Err(AuthError::BadCredentials);
        }

        if !user.is_credentials_non_expired() {
            return Err(AuthError::CredentialsExpired);
        }

        info!(user_id = ?user.id, "user authenticated");
        Ok(user)
    }
}

fn check_account_status(details: &impl UserDetails) -> Result<(), AuthError> {
    if !details.is_account_non_locked() {
        return Err(AuthError::Locked);
    }
    if !details.is_enabled() {
        return Err(AuthError::Disabled);
    }
    if !details.is_account_non_expired() {
        return Err(AuthError::AccountExpired);
    }
    Ok(())
}
