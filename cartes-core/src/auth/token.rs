use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use jsonwebtoken::errors::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::UserId;

/// Default lifetime of a session token.
pub const DEFAULT_SESSION_TTL: std::time::Duration =
    std::time::Duration::from_secs(60 * 60);

/// Claims carried by a session token: the principal and the expiry, nothing
/// else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Principal the token was minted for.
    pub sub: UserId,
    /// Expiry as Unix seconds.
    pub exp: i64,
}

impl SessionClaims {
    /// The authenticated principal.
    pub fn user_id(&self) -> UserId {
        self.sub
    }
}

/// A freshly minted token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionToken {
    /// Compact JWS handed to the client.
    pub token: String,
    /// Principal the token was minted for.
    pub user_id: UserId,
    /// Expiry, truncated to the second encoded in the claim.
    pub expires_at: DateTime<Utc>,
}

/// Issuer construction, signing and validation failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The signing secret was empty.
    #[error("token signing secret must not be empty")]
    EmptySecret,
    /// The lifetime was zero or out of range.
    #[error("token lifetime must be positive")]
    InvalidLifetime,
    /// HS256 signing failed.
    #[error("failed to sign session token: {0}")]
    Signing(String),
    /// Signature is fine but `exp` has passed.
    #[error("session token expired")]
    Expired,
    /// Malformed, tampered or signed with another key.
    #[error("invalid session token")]
    Invalid,
}

/// Signs and validates HS256 session tokens.
///
/// Tokens are stateless: validity is signature plus expiry, there is no
/// server-side session table and no revocation list.
#[derive(Clone)]
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for SessionTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokenIssuer {
    /// Build an issuer for `secret`; tokens live for `ttl`.
    pub fn new(
        secret: impl AsRef<[u8]>,
        ttl: std::time::Duration,
    ) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let ttl =
            Duration::from_std(ttl).map_err(|_| TokenError::InvalidLifetime)?;
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidLifetime);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    /// Mint a token for `user_id` that expires `ttl` from now.
    pub fn mint(&self, user_id: UserId) -> Result<SessionToken, TokenError> {
        self.mint_at(user_id, Utc::now())
    }

    fn mint_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            sub: user_id,
            exp: expires_at.timestamp(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))?;

        Ok(SessionToken {
            token,
            user_id,
            // Round to the second actually encoded in the claim.
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    /// Check signature and expiry and return the embedded claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
