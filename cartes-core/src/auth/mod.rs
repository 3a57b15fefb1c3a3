//! Credential verification and session issuance.
//!
//! - [`AuthCrypto`] hashes and verifies secrets (Argon2id with a server-side
//!   pepper).
//! - [`SessionTokenIssuer`] mints and validates stateless HS256 session
//!   tokens.
//! - [`Authenticator`] ties both to a
//!   [`CredentialStore`](crate::database::CredentialStore).

/// Argon2id hashing with a server-side pepper
pub mod crypto;
/// Login and registration flow
pub mod service;
/// HS256 session tokens
pub mod token;

pub use crypto::{AuthCrypto, AuthCryptoError};
pub use service::{AuthenticationError, Authenticator};
pub use token::{
    DEFAULT_SESSION_TTL, SessionClaims, SessionToken, SessionTokenIssuer,
    TokenError,
};
