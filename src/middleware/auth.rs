use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{SessionClaims, SessionIssuer};
use crate::error::ApiError;

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionClaims> for AuthUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Session authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(sessions): State<Arc<SessionIssuer>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = sessions.verify(extract_bearer_token(&headers))?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header. Any other scheme
/// counts as no token at all.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
