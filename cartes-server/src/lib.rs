//! # Cartes Server
//!
//! HTTP front of the card catalog:
//!
//! - `GET /cartes` filtered, sorted, paginated catalog listing
//! - `GET|PUT|DELETE /cartes/{id}` single card access (writes need a session)
//! - `POST /connexion` credential check that issues a bearer session token
//! - `POST|GET /utilisateurs` registration and (authenticated) user listing
//!
//! Storage and credential checks live in `cartes-core`; this crate wires them
//! to axum and owns the HTTP error mapping.

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
pub use infra::startup::{build_authenticator, create_app};
