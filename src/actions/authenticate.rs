//! Sign-in and sign-out actions

use crate::core::auth::{AuthErrorKind, AuthProvider, Session, SessionState, SignInStrategy};
use crate::core::form::{DASHBOARD_PATH, FormData};
use std::sync::Arc;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials.";
pub const GENERIC_AUTH_MESSAGE: &str = "Something went wrong.";

/// Result of a sign-in attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
    /// Signed in; navigate to `redirect`
    Authenticated { session: Session, redirect: String },
    /// Still unauthenticated; show `message` next to the form
    Rejected { message: String },
}

impl SignInOutcome {
    pub fn message(&self) -> Option<&str> {
        match self {
            SignInOutcome::Rejected { message } => Some(message),
            SignInOutcome::Authenticated { .. } => None,
        }
    }

    /// Session state after the attempt
    pub fn state(&self) -> SessionState {
        match self {
            SignInOutcome::Authenticated { session, .. } => {
                SessionState::Authenticated(session.clone())
            }
            SignInOutcome::Rejected { .. } => SessionState::Unauthenticated,
        }
    }
}

/// Credentials sign-in wrapper around an [`AuthProvider`]
#[derive(Clone)]
pub struct AuthActions {
    provider: Arc<dyn AuthProvider>,
}

impl AuthActions {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_in(&self, form: &FormData) -> SignInOutcome {
        let strategy = SignInStrategy::Credentials.as_str();
        match self.provider.sign_in(strategy, form).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "signed in");
                SignInOutcome::Authenticated {
                    session,
                    redirect: DASHBOARD_PATH.to_string(),
                }
            }
            Err(err) => {
                tracing::warn!(kind = %err.kind, "sign-in rejected");
                let message = match err.kind {
                    AuthErrorKind::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE,
                    _ => GENERIC_AUTH_MESSAGE,
                };
                SignInOutcome::Rejected {
                    message: message.to_string(),
                }
            }
        }
    }

    pub async fn sign_out(&self, token: &str) {
        if let Err(err) = self.provider.sign_out(token).await {
            tracing::error!(error = %err, "sign-out failed");
        }
    }

    pub async fn current_state(&self, token: Option<&str>) -> SessionState {
        match token {
            Some(token) => match self.provider.session(token).await {
                Some(session) => SessionState::Authenticated(session),
                None => SessionState::Unauthenticated,
            },
            None => SessionState::Unauthenticated,
        }
    }
}
