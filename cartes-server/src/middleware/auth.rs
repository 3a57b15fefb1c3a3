use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use cartes_core::auth::TokenError;
use tracing::debug;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, UNAUTHORIZED},
};

/// Reject the request unless it carries a valid `Authorization: Bearer` session
/// token. On success the validated
/// [`SessionClaims`](cartes_core::auth::SessionClaims) are attached as a
/// request extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)?;

    let claims = state
        .authenticator()
        .token_issuer()
        .validate(token)
        .map_err(|err| {
            match err {
                TokenError::Expired => debug!("session token expired"),
                other => debug!(error = %other, "session token rejected"),
            }
            AppError::unauthorized(UNAUTHORIZED)
        })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<&str, AppError> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED))
}
