use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::policy::Role;
use crate::config::SecurityConfig;
use crate::error::ApiError;

/// Signed identity carried by every bearer token: who the caller is, which
/// tenant they belong to, and the branch set they are associated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub tenant_id: String,
    pub branch_ids: Vec<String>,
    /// Unique token id, reserved for revocation/audit
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        security: &SecurityConfig,
        user_id: &str,
        username: &str,
        role: Role,
        tenant_id: &str,
        branch_ids: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(security.token_ttl_hours);

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            tenant_id: tenant_id.to_string(),
            branch_ids,
            jti: Uuid::new_v4().to_string(),
            iss: security.jwt_issuer.clone(),
            aud: security.jwt_audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Sign claims into a compact HS256 token.
pub fn issue_token(security: &SecurityConfig, claims: &Claims) -> Result<String, ApiError> {
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key).map_err(|e| {
        ApiError::internal_server_error(format!("JWT generation failed: {e}"))
    })
}

/// Verify signature, issuer, audience and expiry. Any failure, including a
/// malformed token, maps to a single 401.
pub fn validate_token(security: &SecurityConfig, token: &str) -> Result<Claims, ApiError> {
    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());

    let mut validation = Validation::default();
    validation.set_issuer(&[&security.jwt_issuer]);
    validation.set_audience(&[&security.jwt_audience]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| ApiError::unauthenticated(format!("Invalid token: {e}")))?;

    Ok(token_data.claims)
}
