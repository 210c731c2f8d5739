//! Authentication middleware
//!
//! Verifies the bearer JWT and turns its claims into a [`Caller`]. Identity
//! issuance happens elsewhere; this only checks the signature and expiry.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::{PermissionSet, RoleRegistry, TenantId};

use crate::error::AppError;
use crate::models::Caller;
use crate::AppState;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Business the account belongs to; platform accounts have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    pub role: String,
    /// Browsing session id
    pub sid: String,
    pub exp: i64,
    pub iat: i64,
}

/// Decode and validate JWT token
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Build the caller a set of claims stands for
pub fn caller_from_claims(claims: Claims, roles: &RoleRegistry) -> Caller {
    let permissions = match roles.permissions_of(&claims.role) {
        Ok(permissions) => permissions,
        Err(e) => {
            tracing::warn!(user_id = %claims.sub, "{}; using the most restrictive permissions", e);
            PermissionSet::most_restrictive()
        }
    };

    Caller::new(
        claims.sub,
        permissions,
        claims
            .business_id
            .filter(|id| !id.is_empty())
            .map(TenantId::new),
        claims.sid,
    )
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return AppError::Unauthorized {
            message: "Missing or invalid Authorization header".to_string(),
            message_es: "Falta el encabezado Authorization o no es válido".to_string(),
        }
        .into_response();
    };

    let claims = match decode_jwt(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let caller = caller_from_claims(claims, &state.roles);
    request.extensions_mut().insert(caller);

    next.run(request).await
}

/// Extractor for the authenticated caller
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Caller);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication required".to_string(),
                message_es: "Se requiere iniciar sesión".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn claims(role: &str, business_id: Option<&str>, exp: i64) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            business_id: business_id.map(str::to_string),
            role: role.to_string(),
            sid: "session-1".to_string(),
            exp,
            iat: chrono::Utc::now().timestamp(),
        }
    }

    fn token(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let decoded = decode_jwt(&token(&claims("manager", Some("biz-1"), exp)), "test-secret").unwrap();
        assert_eq!(decoded.role, "manager");
        assert_eq!(decoded.business_id.as_deref(), Some("biz-1"));
    }

    #[test]
    fn test_expired_and_forged_tokens() {
        let expired = chrono::Utc::now().timestamp() - 3600;
        assert!(matches!(
            decode_jwt(&token(&claims("manager", None, expired)), "test-secret"),
            Err(AppError::TokenExpired)
        ));

        let exp = chrono::Utc::now().timestamp() + 3600;
        assert!(matches!(
            decode_jwt(&token(&claims("root", None, exp)), "other-secret"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_unknown_role_gets_no_permissions() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let caller = caller_from_claims(claims("superadmin", Some("biz-1"), exp), &RoleRegistry::new());
        assert!(!caller.is_privileged());
        assert!(caller.permissions.granted().is_empty());
        assert_eq!(caller.assigned_tenant_id, Some(TenantId::from("biz-1")));
        assert_eq!(caller.session_id, "session-1");
    }
}
