use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use cartes_core::{StoreError, auth::AuthenticationError};

pub type AppResult<T> = Result<T, AppError>;

pub const SERVER_ERROR: &str = "Erreur serveur";
pub const INVALID_CREDENTIALS: &str = "Identifiants incorrects";
pub const UNAUTHORIZED: &str = "Non autorisé";
pub const CARD_NOT_FOUND: &str = "Carte non trouvée";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => {
                Self::not_found("Ressource non trouvée")
            }
            StoreError::Conflict(_) => {
                Self::conflict("Ressource déjà existante")
            }
            StoreError::Unavailable(_) | StoreError::Query(_) => {
                tracing::error!(error = %err, "store operation failed");
                Self::internal(SERVER_ERROR)
            }
        }
    }
}

impl From<AuthenticationError> for AppError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => {
                Self::unauthorized(INVALID_CREDENTIALS)
            }
            AuthenticationError::DuplicatePrincipal => {
                Self::conflict("Nom d'utilisateur déjà utilisé")
            }
            AuthenticationError::MissingField(field) => {
                Self::bad_request(format!("Champ requis manquant : {field}"))
            }
            AuthenticationError::Store(store) => store.into(),
            AuthenticationError::Crypto(_) | AuthenticationError::Token(_) => {
                tracing::error!(
                    error = %err,
                    "authentication failed unexpectedly"
                );
                Self::internal(SERVER_ERROR)
            }
        }
    }
}
