//! Storage ports and adapters.
//!
//! The core never talks to a connection directly: the HTTP layer injects an
//! implementation of each port. [`postgres`] is the production adapter,
//! [`memory`] backs tests and local experiments.

/// Adapters backed by process memory
pub mod memory;
/// The traits the HTTP layer depends on
pub mod ports;

#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
/// PostgreSQL adapters and pool setup
pub mod postgres;

pub use memory::{InMemoryCatalog, InMemoryCredentialStore};
pub use ports::{
    CatalogRepository, CredentialRecord, CredentialStore, PrincipalSummary,
};

#[cfg(feature = "database")]
pub use postgres::{
    PoolSettings, PostgresCatalogRepository, PostgresCredentialStore, connect,
};
