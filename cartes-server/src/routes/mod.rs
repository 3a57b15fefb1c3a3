use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    handlers::{catalog, users},
    infra::app_state::AppState,
    middleware::require_session,
};

pub mod paths {
    pub const CARDS: &str = "/cartes";
    pub const CARD: &str = "/cartes/{id}";
    pub const LOGIN: &str = "/connexion";
    pub const USERS: &str = "/utilisateurs";

    /// Concrete path for a single card.
    pub fn card(id: i64) -> String {
        CARD.replace("{id}", &id.to_string())
    }
}

/// Every endpoint, with writes and the user listing behind [`require_session`].
pub fn create_api_router(state: AppState) -> Router<AppState> {
    let session = middleware::from_fn_with_state(state, require_session);

    Router::new()
        .route(paths::CARDS, get(catalog::list_cards))
        .route(
            paths::CARD,
            get(catalog::get_card).merge(
                put(catalog::update_card)
                    .delete(catalog::delete_card)
                    .route_layer(session.clone()),
            ),
        )
        .route(paths::LOGIN, post(users::login))
        .route(
            paths::USERS,
            post(users::register)
                .merge(get(users::list_users).route_layer(session)),
        )
}
