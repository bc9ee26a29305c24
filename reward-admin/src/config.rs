//! Admin service configuration

use thiserror::Error;

use crate::flags::FeatureFlags;

const DEVELOPMENT: &str = "development";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be set in {environment} environment")]
    MissingSecret {
        name: &'static str,
        environment: String,
    },
    #[error("{name} must not be empty in {environment} environment")]
    EmptySecret {
        name: &'static str,
        environment: String,
    },
}

/// Admin service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for admin bearer tokens
    pub jwt_secret: String,
    /// Allowed CORS origin (permissive when unset)
    pub cors_origin: Option<String>,
    pub flags: FeatureFlags,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| DEVELOPMENT.into());

        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: require_secret(&lookup, "JWT_SECRET", &environment)?,
            cors_origin: lookup("CORS_ORIGIN").filter(|s| !s.is_empty()),
            flags: FeatureFlags::from_lookup(&lookup),
            environment,
        })
    }
}

/// Secrets must be set and non-empty outside development.
fn require_secret(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    environment: &str,
) -> Result<String, ConfigError> {
    let val = match lookup(name) {
        Some(v) => v,
        None => {
            if environment != DEVELOPMENT {
                return Err(ConfigError::MissingSecret {
                    name,
                    environment: environment.to_string(),
                });
            }
            format!("dev-{name}-not-for-production")
        }
    };
    if val.is_empty() && environment != DEVELOPMENT {
        return Err(ConfigError::EmptySecret {
            name,
            environment: environment.to_string(),
        });
    }
    Ok(val)
}
