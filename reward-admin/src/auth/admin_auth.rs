//! Admin JWT authentication for the management API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::types::Permission;

use crate::state::AppState;

/// JWT claims for admin authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Admin ID
    pub sub: String,
    pub email: String,
    /// Granted permissions (`rewards:manage`, `rewards:*`, `all`, ...)
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated admin identity extracted from JWT
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub admin_id: String,
    pub email: String,
    pub permissions: Vec<Permission>,
}

impl AdminIdentity {
    pub fn has(&self, action: &str) -> bool {
        self.permissions.iter().any(|p| p.grants(action))
    }

    /// `PermissionDenied` unless some permission grants `action`
    pub fn require(&self, action: &str) -> Result<(), AppError> {
        if self.has(action) {
            return Ok(());
        }
        tracing::debug!(admin_id = %self.admin_id, action, "Permission denied");
        Err(AppError::permission_denied(format!("Missing permission '{action}'"))
            .with_detail("permission", action))
    }
}

const JWT_EXPIRY_HOURS: i64 = 12;

/// Create a JWT token for an admin
pub fn create_token(
    admin_id: &str,
    email: &str,
    permissions: &[&str],
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = AdminClaims {
        sub: admin_id.to_string(),
        email: email.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and build the identity it carries
pub fn verify_token(token: &str, secret: &str) -> Result<AdminIdentity, AppError> {
    let token_data = jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid or expired token"),
        }
    })?;

    let claims = token_data.claims;
    Ok(AdminIdentity {
        admin_id: claims.sub,
        email: claims.email,
        permissions: claims.permissions.into_iter().map(Permission).collect(),
    })
}

/// Middleware that extracts and verifies the admin JWT from the Authorization header
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    let identity = verify_token(token, &state.jwt_secret)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
