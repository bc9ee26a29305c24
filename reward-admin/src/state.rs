//! Application state for the admin service

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::BoxError;
use crate::config::Config;
use crate::flags::FeatureFlags;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// HS256 secret for admin bearer tokens
    pub jwt_secret: String,
    /// Feature switches
    pub flags: FeatureFlags,
    /// Allowed CORS origin (permissive when unset)
    pub cors_origin: Option<String>,
}

impl AppState {
    /// Connect, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config))
    }

    /// Build the state around an existing pool
    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            flags: config.flags,
            cors_origin: config.cors_origin.clone(),
        }
    }
}
