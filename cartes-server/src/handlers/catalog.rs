use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use cartes_core::{
    CardId, StoreError,
    auth::SessionClaims,
    catalog::{
        Card, CardFields, CatalogCriteria, CatalogQueryBuilder, PageRequest,
        SortMode,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult, CARD_NOT_FOUND},
};

/// Raw listing parameters. Everything stays a string so malformed values are
/// coerced to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "sortPrice")]
    pub sort_price: Option<String>,
    #[serde(rename = "sortAlphabetical")]
    pub sort_alphabetical: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn list_cards(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Vec<Card>>> {
    let criteria = CatalogCriteria::new(
        params.name.as_deref(),
        params.category.as_deref(),
        params.rarity.as_deref(),
    );
    let sort = SortMode::from_flags(
        params.sort_alphabetical.as_deref(),
        params.sort_price.as_deref(),
    );
    let page = PageRequest::coerce(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.page_defaults(),
    );

    let query = CatalogQueryBuilder::build(&criteria, sort, page);
    debug!(
        sql = query.sql(),
        params = query.params().len(),
        page = page.number(),
        size = page.size(),
        "catalog query"
    );

    let cards = state.catalog().search(&query).await?;
    Ok(Json(cards))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Card>> {
    state
        .catalog()
        .get_card(CardId(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(CARD_NOT_FOUND))
}

pub async fn update_card(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Path(id): Path<i64>,
    Json(fields): Json<CardFields>,
) -> AppResult<Json<MessageResponse>> {
    state
        .catalog()
        .update_card(CardId(id), &fields)
        .await
        .map_err(card_error)?;

    info!(card_id = id, user_id = %session.user_id(), "card updated");
    Ok(Json(MessageResponse {
        message: "Carte mise à jour avec succès",
    }))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state
        .catalog()
        .delete_card(CardId(id))
        .await
        .map_err(card_error)?;

    info!(card_id = id, user_id = %session.user_id(), "card deleted");
    Ok(Json(MessageResponse {
        message: "Carte supprimée avec succès",
    }))
}

fn card_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::not_found(CARD_NOT_FOUND),
        other => other.into(),
    }
}
