use std::{fmt, sync::Arc};

use cartes_config::Config;
use cartes_core::{
    auth::Authenticator,
    catalog::PageDefaults,
    database::{CatalogRepository, CredentialStore},
};

/// Shared handler state. Cloning is cheap: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    catalog: Arc<dyn CatalogRepository>,
    credentials: Arc<dyn CredentialStore>,
    authenticator: Arc<Authenticator>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        catalog: Arc<dyn CatalogRepository>,
        credentials: Arc<dyn CredentialStore>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            config,
            catalog,
            credentials,
            authenticator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &dyn CatalogRepository {
        self.catalog.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn page_defaults(&self) -> PageDefaults {
        PageDefaults {
            page_size: self.config.catalog.default_page_size,
            max_page_size: self.config.catalog.max_page_size,
        }
    }
}
