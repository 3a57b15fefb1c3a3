use thiserror::Error;

use crate::constants::MIN_SECRET_LENGTH;
use crate::models::{AuthConfig, CatalogConfig, Config};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid catalog page sizes: {reason}")]
    InvalidPageSizes { reason: String },
    #[error("AUTH_TOKEN_TTL must be greater than zero")]
    ZeroTokenTtl,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.dev_mode {
        if config.auth.is_dev_pepper() || config.auth.is_dev_token_secret() {
            warnings.push_with_hint(
                "DEV_MODE is enabled and built-in development secrets are \
                 in use",
                "Set AUTH_PASSWORD_PEPPER and AUTH_TOKEN_SECRET before \
                 exposing this server",
            );
        }
    } else {
        enforce_secrets(&config.auth)?;
        if config.cors.is_wildcard_included() {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
    }

    if config.auth.token_ttl.is_zero() {
        return Err(ConfigGuardRailError::ZeroTokenTtl);
    }

    validate_page_sizes(&config.catalog)?;

    if config.cors.allowed_origins.is_empty() {
        warnings.push_with_hint(
            "CORS_ALLOWED_ORIGINS not set; browsers on other origins will be \
             refused",
            "List the web client's origin in CORS_ALLOWED_ORIGINS or \
             [cors].allowed_origins",
        );
    }

    Ok(warnings)
}

fn enforce_secrets(auth: &AuthConfig) -> Result<(), ConfigGuardRailError> {
    if auth.is_dev_pepper() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: "uses the development placeholder value".into(),
        });
    }
    if auth.password_pepper.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }
    if auth.is_dev_token_secret() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_TOKEN_SECRET",
            reason: "uses the development placeholder value".into(),
        });
    }
    if auth.token_secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_TOKEN_SECRET",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }
    Ok(())
}

fn validate_page_sizes(
    catalog: &CatalogConfig,
) -> Result<(), ConfigGuardRailError> {
    if catalog.default_page_size == 0 || catalog.max_page_size == 0 {
        return Err(ConfigGuardRailError::InvalidPageSizes {
            reason: "page sizes must be greater than zero".into(),
        });
    }
    if catalog.default_page_size > catalog.max_page_size {
        return Err(ConfigGuardRailError::InvalidPageSizes {
            reason: format!(
                "default_page_size {} exceeds max_page_size {}",
                catalog.default_page_size, catalog.max_page_size
            ),
        });
    }
    Ok(())
}
