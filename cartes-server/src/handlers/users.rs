use std::fmt;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cartes_core::{
    auth::{AuthenticationError, SessionClaims},
    database::PrincipalSummary,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult, INVALID_CREDENTIALS},
};

/// Login and registration body. Accepts the French keys used by the web
/// client and their English equivalents.
#[derive(Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default, alias = "pseudo")]
    pub username: String,
    #[serde(default, alias = "mot_de_passe")]
    pub password: String,
}

impl fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
}

/// `POST /connexion`.
///
/// Failures keep the `{success, message}` shape the client expects rather than
/// the generic error envelope.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Response {
    match state
        .authenticator()
        .verify(&request.username, &request.password)
        .await
    {
        Ok(session) => Json(LoginResponse {
            success: true,
            message: "Connexion réussie".to_string(),
            token: Some(session.token),
        })
        .into_response(),
        Err(AuthenticationError::InvalidCredentials) => login_failure(
            StatusCode::UNAUTHORIZED,
            INVALID_CREDENTIALS.to_string(),
        ),
        Err(err) => {
            let AppError { status, message } = err.into();
            login_failure(status, message)
        }
    }
}

fn login_failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(LoginResponse {
            success: false,
            message,
            token: None,
        }),
    )
        .into_response()
}

/// `POST /utilisateurs`.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    state
        .authenticator()
        .register(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Utilisateur ajouté avec succès",
        }),
    ))
}

/// `GET /utilisateurs`, session required.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
) -> AppResult<Json<Vec<PrincipalSummary>>> {
    let users = state.credentials().list_principals().await?;
    debug!(user_id = %session.user_id(), count = users.len(), "listed users");
    Ok(Json(users))
}
