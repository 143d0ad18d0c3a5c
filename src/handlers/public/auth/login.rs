// handlers/public/auth/login.rs - POST /api/login

use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::auth::SessionIssuer;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{CredentialError, CredentialStore};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/login - Exchange username and password for a session token
///
/// A missing or non-string field is reported exactly like a wrong password.
pub async fn post(
    State(credentials): State<Arc<CredentialStore>>,
    State(sessions): State<Arc<SessionIssuer>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(payload) = payload?;

    let (username, password) = match (
        payload.get("username").and_then(Value::as_str),
        payload.get("password").and_then(Value::as_str),
    ) {
        (Some(username), Some(password)) => (username, password),
        _ => return Err(CredentialError::InvalidCredentials.into()),
    };

    let user = credentials.login(username, password).await?;
    let token = sessions.mint(&user)?;

    Ok(ApiResponse::success(LoginResponse { token }))
}
