//! Session middleware: cookie extraction and JWT verification.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use kyf_core::auth::jwt::verify_token;
use kyf_core::models::auth::TokenClaims;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::session_token;

/// Key used to store `TokenClaims` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

/// Claims from the session cookie, if it holds a valid token.
///
/// Missing cookie, bad signature and expiry all yield `None`.
pub fn session_claims(state: &AppState, headers: &HeaderMap) -> Option<TokenClaims> {
    let token = session_token(headers)?;
    verify_token(&token, state.config.jwt_secret.as_bytes()).ok()
}

/// Axum middleware: reads the `token` cookie, verifies the JWT and injects
/// `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = session_claims(&state, request.headers())
        .ok_or_else(|| AppError::Unauthenticated("Not authenticated".into()))?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}
