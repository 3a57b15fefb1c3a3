use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::{CARD_COLUMNS, Card, CardFields, CatalogQuery, SqlParam};
use crate::database::ports::{
    CatalogRepository, CredentialRecord, CredentialStore, PrincipalSummary,
};
use crate::error::{Result, StoreError};
use crate::types::{CardId, UserId};

/// Pool sizing for [`connect`].
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// How long a query waits for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Open a connection pool.
///
/// Every query below borrows one connection from this pool for its own
/// duration; the guard returns it on success and error paths alike.
pub async fn connect(
    database_url: &str,
    settings: PoolSettings,
) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!(
                "Failed to connect to database: {}",
                e
            ))
        })
}

/// PostgreSQL-backed implementation of the `CatalogRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    /// Wrap a pool opened with [`connect`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Card>> {
        debug!(
            sql = query.sql(),
            params = query.params().len(),
            "catalog search"
        );

        let mut statement = sqlx::query_as::<_, Card>(query.sql());
        for param in query.params() {
            statement = match param {
                SqlParam::Text(value) => statement.bind(value.clone()),
                SqlParam::BigInt(value) => statement.bind(*value),
            };
        }

        statement.fetch_all(self.pool()).await.map_err(StoreError::from)
    }

    async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1");
        sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(StoreError::from)
    }

    async fn update_card(&self, id: CardId, fields: &CardFields) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE cards SET
                name = $1, card_type = $2, frame_type = $3, description = $4,
                race = $5, archetype = $6, reference_url = $7, set_name = $8,
                set_code = $9, set_rarity = $10, set_price = $11,
                cardmarket_price = $12, tcgplayer_price = $13, ebay_price = $14,
                amazon_price = $15, coolstuffinc_price = $16, image_url = $17,
                attack = $18, defense = $19, level = $20, attribute = $21
            WHERE id = $22
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.card_type)
        .bind(&fields.frame_type)
        .bind(&fields.description)
        .bind(&fields.race)
        .bind(&fields.archetype)
        .bind(&fields.reference_url)
        .bind(&fields.set_name)
        .bind(&fields.set_code)
        .bind(&fields.set_rarity)
        .bind(fields.set_price)
        .bind(fields.cardmarket_price)
        .bind(fields.tcgplayer_price)
        .bind(fields.ebay_price)
        .bind(fields.amazon_price)
        .bind(fields.coolstuffinc_price)
        .bind(&fields.image_url)
        .bind(fields.attack)
        .bind(fields.defense)
        .bind(fields.level)
        .bind(&fields.attribute)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("card {}", id)));
        }

        info!(card_id = %id, "Updated card");
        Ok(())
    }

    async fn delete_card(&self, id: CardId) -> Result<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("card {}", id)));
        }

        info!(card_id = %id, "Deleted card");
        Ok(())
    }
}

/// PostgreSQL-backed implementation of the `CredentialStore` port.
///
/// Relies on the `users_username_key` unique constraint for duplicate
/// detection.
#[derive(Clone, Debug)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Wrap a pool opened with [`connect`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<CredentialRecord>> {
        let rows = sqlx::query(
            "SELECT id, username, password_hash FROM users \
             WHERE username = $1",
        )
        .bind(username)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CredentialRecord {
                    user_id: row.try_get("id")?,
                    username: row.try_get("username")?,
                    password_hash: row.try_get("password_hash")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserId> {
        let user_id: UserId = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
             RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict("Username already exists".to_string())
            }
            other => other,
        })?;

        info!("Created user: {} ({})", username, user_id);
        Ok(user_id)
    }

    async fn list_principals(&self) -> Result<Vec<PrincipalSummary>> {
        let rows = sqlx::query("SELECT id, username FROM users ORDER BY id")
            .fetch_all(self.pool())
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PrincipalSummary {
                    id: row.try_get("id")?,
                    username: row.try_get("username")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }
}
