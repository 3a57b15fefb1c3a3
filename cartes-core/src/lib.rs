//! # Cartes Core
//!
//! Core library for the card catalog service: catalog query building,
//! credential verification, session token issuance and the storage ports the
//! HTTP layer talks to.
//!
//! ## Overview
//!
//! - **Catalog**: card records plus a pure query builder that turns optional
//!   filters, a sort mode and a page window into one parameterized statement
//! - **Authentication**: Argon2id password hashing, uniform credential
//!   verification and stateless HS256 session tokens
//! - **Database Abstraction**: trait-based ports with PostgreSQL and
//!   in-memory adapters
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL adapters and embedded migrations
//!   (SQLx)
//! - `e2e`: Enables tests that need a live PostgreSQL server
//!
//! ## Examples
//!
//! ```
//! use cartes_core::catalog::{
//!     CatalogCriteria, CatalogQueryBuilder, PageRequest, SortMode,
//! };
//!
//! let criteria =
//!     CatalogCriteria::new(Some("Dragon"), Some("Spell Card"), None);
//! let page = PageRequest::new(2, 10);
//! let query =
//!     CatalogQueryBuilder::build(&criteria, SortMode::Unsorted, page);
//!
//! assert_eq!(query.params().len(), 4);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Authentication: password hashing, session tokens and the credential flow
pub mod auth;

/// Card records and the catalog query builder
pub mod catalog;

/// Storage ports and their adapters
pub mod database;

/// Error types shared by the storage ports
pub mod error;

/// Strongly typed identifiers
pub mod types;

/// Embedded schema migrations for the PostgreSQL adapters.
#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator =
    sqlx::migrate!("./migrations");

pub use error::{Result, StoreError};
pub use types::{CardId, UserId};
