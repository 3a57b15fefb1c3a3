#![cfg(feature = "e2e")]

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use cartes_core::{
    auth::{AuthCrypto, Authenticator, DEFAULT_SESSION_TTL, SessionTokenIssuer},
    database::{PostgresCatalogRepository, PostgresCredentialStore},
};
use cartes_server::{AppState, create_app, routes::paths};
use serde_json::{Value, json};
use sqlx::PgPool;

mod support;

fn server_over(pool: PgPool) -> Result<TestServer> {
    let catalog = Arc::new(PostgresCatalogRepository::new(pool.clone()));
    let credentials = Arc::new(PostgresCredentialStore::new(pool));
    let crypto = AuthCrypto::insecure_fast("e2e-pepper")?;
    let tokens =
        SessionTokenIssuer::new("e2e-token-secret", DEFAULT_SESSION_TTL)?;
    let authenticator = Authenticator::new(
        credentials.clone(),
        Arc::new(crypto),
        Arc::new(tokens),
    )?;
    let state = AppState::new(
        Arc::new(support::test_config()),
        catalog,
        credentials,
        Arc::new(authenticator),
    );
    TestServer::new(create_app(state))
        .map_err(|err| anyhow::anyhow!(err.to_string()))
}

#[sqlx::test(migrator = "cartes_core::MIGRATOR")]
async fn catalog_filters_against_postgres(pool: PgPool) -> Result<()> {
    for (name, card_type, price) in [
        ("Blue-Eyes White Dragon", "Normal Monster", 42.0),
        ("Dragon Shrine", "Spell Card", 1.5),
        ("Mirror Force", "Trap Card", 6.0),
    ] {
        sqlx::query(
            "INSERT INTO cards (name, card_type, set_price) \
             VALUES ($1, $2, $3)",
        )
        .bind(name)
        .bind(card_type)
        .bind(price)
        .execute(&pool)
        .await?;
    }
    let server = server_over(pool)?;

    let monsters: Value = server
        .get(paths::CARDS)
        .add_query_param("type", "Monster Card")
        .await
        .json();
    assert_eq!(monsters.as_array().map(Vec::len), Some(1));
    assert_eq!(monsters[0]["nom"], "Blue-Eyes White Dragon");

    let cheapest_first: Value = server
        .get(paths::CARDS)
        .add_query_param("sortPrice", "ASC")
        .await
        .json();
    assert_eq!(cheapest_first[0]["nom"], "Dragon Shrine");
    Ok(())
}

#[sqlx::test(migrator = "cartes_core::MIGRATOR")]
async fn register_login_and_conflict_against_postgres(
    pool: PgPool,
) -> Result<()> {
    let server = server_over(pool)?;
    let body = json!({ "pseudo": "yugi", "mot_de_passe": "dark-magician" });

    server
        .post(paths::USERS)
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post(paths::USERS)
        .json(&body)
        .await
        .assert_status(StatusCode::CONFLICT);

    let login: Value = server.post(paths::LOGIN).json(&body).await.json();
    assert_eq!(login["success"], true);
    Ok(())
}
