use axum::http::StatusCode;
use cartes_core::catalog::SqlParam;
use cartes_server::routes::paths;
use serde_json::{Value, json};

mod support;
use support::{bearer, build_test_app, sample_cards};

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|card| card["nom"].as_str().expect("nom"))
        .collect()
}

#[tokio::test]
async fn lists_cards_with_client_keys() {
    let app = build_test_app(sample_cards());

    let response = app.server.get(paths::CARDS).await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body.as_array().unwrap().len(), 4);
    let first = &body[0];
    assert_eq!(first["id"], 1);
    assert_eq!(first["nom"], "Blue-Eyes White Dragon");
    assert_eq!(first["type"], "Normal Monster");
    assert_eq!(first["set_rarity"], "Ultra Rare");
}

#[tokio::test]
async fn listing_builds_a_parameterised_query() {
    let app = build_test_app(sample_cards());

    app.server
        .get(paths::CARDS)
        .add_query_param("name", "Dragon")
        .add_query_param("type", "Spell Card")
        .add_query_param("page", "2")
        .add_query_param("limit", "10")
        .await
        .assert_status_ok();

    let queries = app.catalog.recorded_queries().await;
    let query = queries.last().expect("recorded query");
    assert!(query.sql().contains(
        "WHERE name ILIKE $1 AND card_type = $2 LIMIT $3 OFFSET $4"
    ));
    assert_eq!(
        query.params(),
        &[
            SqlParam::from("%Dragon%"),
            SqlParam::from("Spell Card"),
            SqlParam::BigInt(10),
            SqlParam::BigInt(10),
        ]
    );
}

#[tokio::test]
async fn malformed_paging_falls_back_to_defaults() {
    let app = build_test_app(sample_cards());

    for page in ["0", "-5", "abc"] {
        app.server
            .get(paths::CARDS)
            .add_query_param("page", page)
            .add_query_param("limit", "nope")
            .await
            .assert_status_ok();

        let queries = app.catalog.recorded_queries().await;
        let query = queries.last().expect("recorded query");
        assert_eq!(
            query.params(),
            &[SqlParam::BigInt(27), SqlParam::BigInt(0)],
            "page {page:?}"
        );
    }
}

#[tokio::test]
async fn oversized_limit_is_clamped() {
    let app = build_test_app(sample_cards());

    app.server
        .get(paths::CARDS)
        .add_query_param("limit", "1000000")
        .await
        .assert_status_ok();

    let queries = app.catalog.recorded_queries().await;
    assert_eq!(queries.last().unwrap().params()[0], SqlParam::BigInt(1000));
}

#[tokio::test]
async fn page_window_is_applied() {
    let app = build_test_app(sample_cards());

    let response = app
        .server
        .get(paths::CARDS)
        .add_query_param("page", "2")
        .add_query_param("limit", "3")
        .await;
    response.assert_status_ok();
    assert_eq!(names(&response.json()), vec!["Dark Magician"]);
}

#[tokio::test]
async fn alphabetical_sort_wins_over_price() {
    let app = build_test_app(sample_cards());

    app.server
        .get(paths::CARDS)
        .add_query_param("sortAlphabetical", "ASC")
        .add_query_param("sortPrice", "DESC")
        .await
        .assert_status_ok();

    let queries = app.catalog.recorded_queries().await;
    let sql = queries.last().unwrap().sql().to_string();
    assert!(sql.ends_with(" ORDER BY name ASC LIMIT $1 OFFSET $2"), "{sql}");
    assert!(!sql.contains("ORDER BY set_price"), "{sql}");
}

#[tokio::test]
async fn single_card_lookup() {
    let app = build_test_app(sample_cards());

    let response = app.server.get(&paths::card(2)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["nom"], "Dragon Shrine");

    let missing = app.server.get(&paths::card(99)).await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        missing.json::<Value>()["error"]["message"],
        "Carte non trouvée"
    );
}

#[tokio::test]
async fn writes_require_a_session() {
    let app = build_test_app(sample_cards());
    let update = json!({
        "nom": "Dragon Shrine",
        "type": "Spell Card",
        "set_price": 2.0
    });

    app.server
        .put(&paths::card(2))
        .json(&update)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .delete(&paths::card(2))
        .add_header("Authorization", "Bearer not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .delete(&paths::card(2))
        .add_header("Authorization", "Basic a2FpYmE6c2VjcmV0")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Reads stay public.
    app.server.get(&paths::card(2)).await.assert_status_ok();
}

#[tokio::test]
async fn authenticated_update_and_delete() {
    let app = build_test_app(sample_cards());
    let token = app.session_for("kaiba", "blue-eyes").await;

    let update = json!({
        "nom": "Dragon Shrine",
        "type": "Spell Card",
        "set_rarity": "Common",
        "set_price": 2.5,
    });
    let response = app
        .server
        .put(&paths::card(2))
        .add_header("Authorization", bearer(&token))
        .json(&update)
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "Carte mise à jour avec succès"
    );

    let card: Value = app.server.get(&paths::card(2)).await.json();
    assert_eq!(card["set_price"], 2.5);

    app.server
        .delete(&paths::card(2))
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status_ok();
    app.server
        .delete(&paths::card(2))
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .put(&paths::card(2))
        .add_header("Authorization", bearer(&token))
        .json(&update)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
