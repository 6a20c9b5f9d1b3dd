use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{FaithGuidanceError, Result};
use crate::handlers::AppState;

/// Where unauthenticated clients are sent to sign in.
pub const SIGN_IN_PATH: &str = "/signin";

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Resolves the bearer token to an `AuthUser` and stores it in request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(req.headers()).ok_or(FaithGuidanceError::Unauthorized)?;

    let user = state.sessions.verify(&token).await?.ok_or_else(|| {
        tracing::debug!("Rejected unknown session token");
        FaithGuidanceError::Unauthorized
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
