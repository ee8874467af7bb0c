//! Authentication for invoice-desk
//!
//! Sign-in goes through a named strategy; the only one shipped is
//! `"credentials"` (email + password checked against configured users).
//! A successful sign-in yields an opaque bearer token that the session
//! gate resolves back to a [`Session`].

use crate::core::form::FormData;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

/// Classification of a failed authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Unknown user, wrong password or malformed credentials
    InvalidCredentials,
    /// The user exists but may not sign in
    AccessDenied,
    /// The provider is misconfigured or the strategy is unknown
    Configuration,
    /// The provider failed while completing the sign-in
    Callback,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::InvalidCredentials => "CredentialsSignin",
            AuthErrorKind::AccessDenied => "AccessDenied",
            AuthErrorKind::Configuration => "Configuration",
            AuthErrorKind::Callback => "CallbackRouteError",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by an [`AuthProvider`]
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::new(AuthErrorKind::InvalidCredentials, "invalid credentials")
    }
}

/// Named sign-in strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInStrategy {
    Credentials,
}

impl SignInStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInStrategy::Credentials => "credentials",
        }
    }
}

impl FromStr for SignInStrategy {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credentials" => Ok(SignInStrategy::Credentials),
            other => Err(AuthError::new(
                AuthErrorKind::Configuration,
                format!("unknown sign-in strategy '{}'", other),
            )),
        }
    }
}

/// Public part of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    pub issued_at: DateTime<Utc>,
}

/// Where a client stands with respect to authentication
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Unauthenticated => None,
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate with the named strategy and open a session
    async fn sign_in(&self, strategy: &str, credentials: &FormData) -> Result<Session, AuthError>;

    /// Close a session; unknown tokens are not an error
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;

    /// Resolve a bearer token
    async fn session(&self, token: &str) -> Option<Session>;
}

/// A user allowed to sign in with credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Plain-text in configuration; hashed when the provider is built
    pub password: String,
}

#[derive(Debug, Validate)]
struct CredentialsPayload {
    #[validate(email)]
    email: String,
    #[validate(length(min = 6))]
    password: String,
}

impl CredentialsPayload {
    fn from_form(form: &FormData) -> Self {
        Self {
            email: form.get("email").unwrap_or_default().trim().to_string(),
            password: form.get("password").unwrap_or_default().to_string(),
        }
    }
}

struct StoredUser {
    user: SessionUser,
    password_digest: [u8; 32],
}

fn password_digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

/// Email + password provider backed by a fixed user list
pub struct CredentialsAuthProvider {
    users: HashMap<String, StoredUser>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl CredentialsAuthProvider {
    pub fn new(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        let users = accounts
            .into_iter()
            .map(|account| {
                let stored = StoredUser {
                    password_digest: password_digest(&account.password),
                    user: SessionUser {
                        id: account.id,
                        name: account.name,
                        email: account.email.clone(),
                    },
                };
                (account.email.to_lowercase(), stored)
            })
            .collect();

        Self {
            users,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn authorize(&self, credentials: &FormData) -> Result<SessionUser, AuthError> {
        let payload = CredentialsPayload::from_form(credentials);
        if payload.validate().is_err() {
            return Err(AuthError::invalid_credentials());
        }

        let Some(stored) = self.users.get(&payload.email.to_lowercase()) else {
            return Err(AuthError::invalid_credentials());
        };

        let submitted = password_digest(&payload.password);
        if bool::from(submitted[..].ct_eq(&stored.password_digest[..])) {
            Ok(stored.user.clone())
        } else {
            Err(AuthError::invalid_credentials())
        }
    }
}

#[async_trait]
impl AuthProvider for CredentialsAuthProvider {
    async fn sign_in(&self, strategy: &str, credentials: &FormData) -> Result<Session, AuthError> {
        match strategy.parse::<SignInStrategy>()? {
            SignInStrategy::Credentials => {}
        }

        let user = self.authorize(credentials)?;
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user,
            issued_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn session(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }
}
