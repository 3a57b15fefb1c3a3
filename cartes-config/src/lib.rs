//! Configuration for the card catalog service.
//!
//! Values are layered: an optional TOML file, then environment variables
//! (optionally seeded from a `.env` file), then whatever the binary applies
//! from its command line. [`ConfigLoader::load`] resolves everything into a
//! [`Config`] plus the [`ConfigWarnings`] worth surfacing at startup.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AuthConfig, CatalogConfig, Config, ConfigMetadata, CorsConfig,
    DatabaseConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
