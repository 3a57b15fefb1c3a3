use std::sync::Arc;

use anyhow::Context;
use axum::{Router, http::HeaderValue};
use cartes_config::AuthConfig;
use cartes_core::{
    auth::{AuthCrypto, Authenticator, SessionTokenIssuer},
    database::CredentialStore,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{infra::app_state::AppState, routes};

/// Build the production [`Authenticator`] from configured secrets.
pub fn build_authenticator(
    auth: &AuthConfig,
    credentials: Arc<dyn CredentialStore>,
) -> anyhow::Result<Authenticator> {
    let crypto = AuthCrypto::new(auth.password_pepper.as_bytes())
        .context("failed to initialise password hashing")?;
    let tokens =
        SessionTokenIssuer::new(auth.token_secret.as_bytes(), auth.token_ttl)
            .context("failed to initialise session tokens")?;
    Authenticator::new(credentials, Arc::new(crypto), Arc::new(tokens))
        .context("failed to prepare credential verification")
}

pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(&state);

    Router::new()
        .merge(routes::create_api_router(state.clone()))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = &state.config().cors;
    if cors.is_wildcard_included() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
