use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::{Card, CardFields, CatalogQuery};
use crate::database::ports::{
    CatalogRepository, CredentialRecord, CredentialStore, PrincipalSummary,
};
use crate::error::{Result, StoreError};
use crate::types::{CardId, UserId};

/// In-memory catalog.
///
/// It cannot evaluate SQL: `search` records the statement it was given and
/// returns the stored cards in insertion order, honouring only the page
/// window. Tests use [`InMemoryCatalog::recorded_queries`] to inspect what the
/// HTTP layer asked for.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    cards: RwLock<Vec<Card>>,
    queries: RwLock<Vec<CatalogQuery>>,
}

impl InMemoryCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog seeded with `cards`, kept in iteration order.
    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: RwLock::new(cards.into_iter().collect()),
            queries: RwLock::default(),
        }
    }

    /// Every statement passed to `search`, oldest first.
    pub async fn recorded_queries(&self) -> Vec<CatalogQuery> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Card>> {
        self.queries.write().await.push(query.clone());

        let page = query.page();
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let cards = self.cards.read().await;
        Ok(cards
            .iter()
            .skip(skip)
            .take(page.size() as usize)
            .cloned()
            .collect())
    }

    async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
        let cards = self.cards.read().await;
        Ok(cards.iter().find(|card| card.id == id).cloned())
    }

    async fn update_card(&self, id: CardId, fields: &CardFields) -> Result<()> {
        let mut cards = self.cards.write().await;
        let card = cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("card {}", id)))?;
        card.fields = fields.clone();
        Ok(())
    }

    async fn delete_card(&self, id: CardId) -> Result<()> {
        let mut cards = self.cards.write().await;
        let before = cards.len();
        cards.retain(|card| card.id != id);
        if cards.len() == before {
            return Err(StoreError::NotFound(format!("card {}", id)));
        }
        Ok(())
    }
}

/// In-memory credential store with the same uniqueness contract as the
/// `users` table.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<Vec<CredentialRecord>>,
}

impl InMemoryCredentialStore {
    /// A store with no principals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record verbatim, bypassing the uniqueness check. Lets tests
    /// model corrupted or duplicated rows.
    pub async fn insert_raw(&self, record: CredentialRecord) {
        self.records.write().await.push(record);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<CredentialRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.username == username)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserId> {
        let mut records = self.records.write().await;
        if records.iter().any(|record| record.username == username) {
            return Err(StoreError::Conflict(
                "Username already exists".to_string(),
            ));
        }

        let next_id = records
            .iter()
            .map(|record| record.user_id.as_i64())
            .max()
            .unwrap_or(0)
            + 1;
        let user_id = UserId(next_id);
        records.push(CredentialRecord {
            user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(user_id)
    }

    async fn list_principals(&self) -> Result<Vec<PrincipalSummary>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|record| PrincipalSummary {
                id: record.user_id,
                username: record.username.clone(),
            })
            .collect())
    }
}
