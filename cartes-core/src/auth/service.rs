use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::crypto::{AuthCrypto, AuthCryptoError};
use super::token::{SessionToken, SessionTokenIssuer, TokenError};
use crate::database::ports::CredentialStore;
use crate::error::StoreError;
use crate::types::UserId;

/// Outcome of a rejected login or registration.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Unknown principal, wrong secret, ambiguous lookup or unreadable stored
    /// hash. Deliberately a single variant.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Registration hit the username uniqueness constraint.
    #[error("Username already exists")]
    DuplicatePrincipal,
    /// Registration body lacked a non-empty value for the named field.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// Hashing failed or its blocking task did not complete.
    #[error("Credential hashing failed: {0}")]
    Crypto(String),
    /// The session token could not be signed.
    #[error("Token issuance failed: {0}")]
    Token(#[from] TokenError),
    /// The credential store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Verifies credentials against a [`CredentialStore`] and mints session
/// tokens.
///
/// Holds no per-request state; one instance is shared by every handler.
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    crypto: Arc<AuthCrypto>,
    tokens: Arc<SessionTokenIssuer>,
    decoy_hash: Arc<str>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Wire the flow together.
    ///
    /// Hashes the decoy used for unknown principals up front, so fails when
    /// `crypto` cannot hash.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        crypto: Arc<AuthCrypto>,
        tokens: Arc<SessionTokenIssuer>,
    ) -> Result<Self, AuthCryptoError> {
        let decoy_hash = crypto.hash_password(DECOY_SECRET)?.into();
        Ok(Self {
            credentials,
            crypto,
            tokens,
            decoy_hash,
        })
    }

    /// Issuer used to validate bearer tokens on gated routes.
    pub fn token_issuer(&self) -> &SessionTokenIssuer {
        &self.tokens
    }

    /// Check `password` for `username` and mint a session token on success.
    ///
    /// Every negative outcome is [`AuthenticationError::InvalidCredentials`];
    /// only store failures and token signing failures surface differently.
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, AuthenticationError> {
        let mut records = self.credentials.find_by_username(username).await?;

        let record = match records.len() {
            1 => records.pop(),
            0 => None,
            count => {
                warn!(username, count, "ambiguous credential lookup");
                None
            }
        };

        let Some(record) = record else {
            // Spend the same hashing work as a real comparison.
            self.burn_decoy(password.to_owned()).await;
            warn!(username, "login rejected");
            return Err(AuthenticationError::InvalidCredentials);
        };

        let matched = self
            .check_password(password.to_owned(), record.password_hash)
            .await?;
        if !matched {
            warn!(username, user_id = %record.user_id, "login rejected");
            return Err(AuthenticationError::InvalidCredentials);
        }

        let token = self.tokens.mint(record.user_id)?;
        info!(user_id = %record.user_id, "session issued");
        Ok(token)
    }

    /// Create a principal. The store's uniqueness constraint decides
    /// duplicates.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserId, AuthenticationError> {
        if username.is_empty() {
            return Err(AuthenticationError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(AuthenticationError::MissingField("password"));
        }

        let crypto = Arc::clone(&self.crypto);
        let secret = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || crypto.hash_password(&secret))
                .await
                .map_err(|err| AuthenticationError::Crypto(err.to_string()))?
                .map_err(|err| AuthenticationError::Crypto(err.to_string()))?;

        let user_id = self
            .credentials
            .insert(username, &password_hash)
            .await
            .map_err(|err| match err {
                StoreError::Conflict(_) => {
                    AuthenticationError::DuplicatePrincipal
                }
                other => AuthenticationError::Store(other),
            })?;

        info!(username, %user_id, "registered principal");
        Ok(user_id)
    }

    async fn check_password(
        &self,
        password: String,
        password_hash: String,
    ) -> Result<bool, AuthenticationError> {
        let crypto = Arc::clone(&self.crypto);
        let outcome = tokio::task::spawn_blocking(move || {
            crypto.verify_password(&password, &password_hash)
        })
        .await
        .map_err(|err| AuthenticationError::Crypto(err.to_string()))?;

        match outcome {
            Ok(matched) => Ok(matched),
            Err(err) => {
                warn!(error = %err, "stored password hash is unreadable");
                Ok(false)
            }
        }
    }

    async fn burn_decoy(&self, password: String) {
        let crypto = Arc::clone(&self.crypto);
        let decoy = Arc::clone(&self.decoy_hash);
        let outcome = tokio::task::spawn_blocking(move || {
            crypto.verify_password(&password, &decoy)
        })
        .await;

        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => error!(error = %err, "decoy verification failed"),
            Err(err) => error!(error = %err, "decoy verification task failed"),
        }
    }
}

const DECOY_SECRET: &str = "decoy-credential";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::DEFAULT_SESSION_TTL;
    use crate::database::memory::InMemoryCredentialStore;

    fn authenticator(crypto: AuthCrypto) -> Authenticator {
        let tokens =
            SessionTokenIssuer::new("unit-token-secret", DEFAULT_SESSION_TTL)
                .unwrap();
        Authenticator::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(crypto),
            Arc::new(tokens),
        )
        .unwrap()
    }

    #[test]
    fn decoy_is_hashed_at_construction() {
        let crypto = AuthCrypto::insecure_fast("pepper").unwrap();
        let auth = authenticator(crypto);

        assert!(auth.decoy_hash.starts_with("$argon2id$"));
        assert!(
            auth.crypto
                .verify_password(DECOY_SECRET, &auth.decoy_hash)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn unknown_user_reuses_the_same_decoy() {
        let crypto = AuthCrypto::insecure_fast("pepper").unwrap();
        let auth = authenticator(crypto);
        let before = Arc::clone(&auth.decoy_hash);

        for _ in 0..2 {
            let outcome = auth.verify("nobody", "whatever").await;
            assert!(matches!(
                outcome,
                Err(AuthenticationError::InvalidCredentials)
            ));
        }
        assert!(Arc::ptr_eq(&before, &auth.decoy_hash));
    }
}
