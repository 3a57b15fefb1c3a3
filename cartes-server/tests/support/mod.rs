#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use cartes_config::{Config, ConfigLoader, EnvConfig};
use cartes_core::{
    CardId,
    auth::{AuthCrypto, Authenticator, DEFAULT_SESSION_TTL, SessionTokenIssuer},
    catalog::{Card, CardFields},
    database::{InMemoryCatalog, InMemoryCredentialStore},
};
use cartes_server::{AppState, create_app};

pub const TOKEN_SECRET: &str = "integration-test-token-secret";

pub struct TestApp {
    pub server: TestServer,
    pub catalog: Arc<InMemoryCatalog>,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub authenticator: Arc<Authenticator>,
}

pub fn test_config() -> Config {
    let env = EnvConfig {
        dev_mode: Some(true),
        cors_allowed_origins: Some(vec!["http://localhost:5173".into()]),
        ..EnvConfig::default()
    };
    ConfigLoader::new()
        .load_with_env(env)
        .expect("test configuration")
        .config
}

pub fn card(
    id: i64,
    name: &str,
    card_type: &str,
    rarity: &str,
    price: f64,
) -> Card {
    let mut fields = CardFields::new(name, card_type);
    fields.set_rarity = Some(rarity.to_string());
    fields.set_price = Some(price);
    Card {
        id: CardId(id),
        fields,
    }
}

pub fn sample_cards() -> Vec<Card> {
    vec![
        card(1, "Blue-Eyes White Dragon", "Normal Monster", "Ultra Rare", 42.0),
        card(2, "Dragon Shrine", "Spell Card", "Common", 1.5),
        card(3, "Dragon's Rebirth", "Trap Card", "Rare", 3.0),
        card(4, "Dark Magician", "Normal Monster", "Ultra Rare", 25.0),
    ]
}

pub fn build_test_app(cards: Vec<Card>) -> TestApp {
    let catalog = Arc::new(InMemoryCatalog::with_cards(cards));
    let credentials = Arc::new(InMemoryCredentialStore::new());

    let crypto =
        AuthCrypto::insecure_fast("integration-test-pepper").expect("crypto");
    let tokens = SessionTokenIssuer::new(TOKEN_SECRET, DEFAULT_SESSION_TTL)
        .expect("issuer");
    let authenticator = Arc::new(
        Authenticator::new(
            credentials.clone(),
            Arc::new(crypto),
            Arc::new(tokens),
        )
        .expect("authenticator"),
    );

    let state = AppState::new(
        Arc::new(test_config()),
        catalog.clone(),
        credentials.clone(),
        authenticator.clone(),
    );
    let server = TestServer::new(create_app(state)).expect("test server");

    TestApp {
        server,
        catalog,
        credentials,
        authenticator,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

impl TestApp {
    /// Register `username` and return a valid session token for it.
    pub async fn session_for(&self, username: &str, password: &str) -> String {
        self.authenticator
            .register(username, password)
            .await
            .expect("register");
        self.authenticator
            .verify(username, password)
            .await
            .expect("verify")
            .token
    }
}
