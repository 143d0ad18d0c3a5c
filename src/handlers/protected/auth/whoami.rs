use axum::extract::Extension;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/whoami - The caller's identity as carried by the token
pub async fn get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(auth_user))
}
