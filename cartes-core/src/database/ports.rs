use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::catalog::{Card, CardFields, CatalogQuery};
use crate::error::Result;
use crate::types::{CardId, UserId};

/// Read and maintenance access to the `cards` table.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Execute a statement produced by
    /// [`CatalogQueryBuilder`](crate::catalog::CatalogQueryBuilder).
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Card>>;

    /// `None` when no card carries `id`.
    async fn get_card(&self, id: CardId) -> Result<Option<Card>>;

    /// Replace every mutable column. `StoreError::NotFound` if the card is
    /// absent.
    async fn update_card(&self, id: CardId, fields: &CardFields) -> Result<()>;

    /// `StoreError::NotFound` if the card is absent.
    async fn delete_card(&self, id: CardId) -> Result<()>;
}

/// A stored principal and the PHC hash of its secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Store-assigned key.
    pub user_id: UserId,
    /// Unique login name.
    pub username: String,
    /// Argon2id PHC string; never the secret itself.
    pub password_hash: String,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Public view of a principal, as listed by `GET /utilisateurs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalSummary {
    /// Store-assigned key.
    pub id: UserId,
    /// Login name, serialized as `pseudo`.
    #[serde(rename = "pseudo")]
    pub username: String,
}

/// Credential persistence.
///
/// Principal-name uniqueness is enforced by the store: `insert` must fail
/// with `StoreError::Conflict` when the name is taken.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Every record stored under `username`. Callers treat anything other
    /// than exactly one match as a miss.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<CredentialRecord>>;

    /// Store a new principal and return its key.
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserId>;

    /// Every principal, without hashes.
    async fn list_principals(&self) -> Result<Vec<PrincipalSummary>>;
}
