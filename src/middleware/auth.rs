use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Holding this permission grants every other permission.
pub const SUPER_PERMISSION: &str = "all";

pub mod permissions {
    pub const QUIZZES_WRITE: &str = "quizzes:write";
    pub const DONATIONS_READ: &str = "donations:read";
    pub const DONATIONS_WRITE: &str = "donations:write";
    pub const VENDORS_READ: &str = "vendors:read";
    pub const VENDORS_WRITE: &str = "vendors:write";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// The authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub permissions: HashSet<String>,
}

impl Principal {
    /// Effective permissions are the granted set, widened to everything when
    /// the set contains [`SUPER_PERMISSION`].
    pub fn allows(&self, permission: &str) -> bool {
        self.permissions.contains(SUPER_PERMISSION) || self.permissions.contains(permission)
    }
}

impl TryFrom<Claims> for Principal {
    type Error = Error;

    fn try_from(claims: Claims) -> Result<Self> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("invalid_subject".to_string()))?;
        Ok(Self {
            id,
            permissions: claims.permissions.into_iter().collect(),
        })
    }
}

/// State for [`require_permission`]: the signing secret and the one
/// permission the guarded route needs.
#[derive(Clone)]
pub struct PermissionGate {
    secret: Arc<str>,
    required: &'static str,
}

impl PermissionGate {
    pub fn new(secret: Arc<str>, required: &'static str) -> Self {
        Self { secret, required }
    }
}

pub fn decode_principal(token: &str, secret: &str) -> Result<Principal> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| Error::Unauthorized("invalid_token".to_string()))?;
    Principal::try_from(data.claims)
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    permissions: &[&str],
    ttl: chrono::Duration,
) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp().max(0) as usize,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
}

fn bearer_principal(req: &Request, secret: &str) -> Result<Principal> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".to_string()))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".to_string()))?;
    decode_principal(token, secret)
}

/// Rejects with 401 without a valid bearer token and 403 when the principal
/// lacks the gate's permission. The handler only runs when both pass.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut req: Request,
    next: Next,
) -> Response {
    let principal = match bearer_principal(&req, &gate.secret) {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };
    if !principal.allows(gate.required) {
        tracing::warn!(user_id = %principal.id, permission = gate.required, "permission denied");
        return Error::Forbidden("forbidden".to_string()).into_response();
    }
    req.extensions_mut().insert(principal);
    next.run(req).await
}
