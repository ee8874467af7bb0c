//! Session gate for dashboard routes

use super::host::ServerHost;
use crate::core::error::{AppError, RequestError};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject requests without a live session; otherwise expose the
/// [`Session`](crate::core::auth::Session) as a request extension
pub async fn require_session(
    State(host): State<Arc<ServerHost>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        return Err(RequestError::Unauthorized {
            message: "missing bearer token".to_string(),
        }
        .into());
    };

    let Some(session) = host.auth.session(token).await else {
        tracing::warn!(path = %request.uri().path(), "rejected unknown session token");
        return Err(RequestError::Unauthorized {
            message: "session expired or unknown".to_string(),
        }
        .into());
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
