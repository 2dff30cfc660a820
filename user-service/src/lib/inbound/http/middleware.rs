use std::sync::Arc;

use auth::Authenticator;
use auth::Claims;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;

/// Verified token claims of the caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: Claims,
}

/// Middleware that validates the bearer token and attaches the caller's claims.
///
/// Only the token is consulted, never the store. Every rejection produces the
/// same response; the reason only reaches the logs.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let claims = authenticator.authenticate_bearer(header).map_err(|rejection| {
        tracing::warn!(
            reason = rejection.code(),
            method = %req.method(),
            uri = %req.uri(),
            "Request rejected"
        );
        ApiError::Unauthorized("Unauthorized".to_string()).into_response()
    })?;

    tracing::debug!(user_id = %claims.sub, role = %claims.role, "Request authenticated");

    req.extensions_mut().insert(AuthenticatedUser { claims });

    Ok(next.run(req).await)
}
