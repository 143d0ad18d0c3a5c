// handlers/public/auth/register.rs - POST /api/register

use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{CredentialStore, Credentials};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub id: u64,
    pub username: String,
}

/// POST /api/register - Create an account
///
/// Body: `{"username": string, "password": string}`. Responds 201 with the
/// new user's id; duplicate names and short passwords are 400s.
pub async fn post(
    State(credentials): State<Arc<CredentialStore>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let Json(payload) = payload?;
    let profile = credentials.register(Credentials::from_payload(&payload)?).await?;

    Ok(ApiResponse::created(RegisterResponse {
        message: "User registered successfully.",
        id: profile.id,
        username: profile.username,
    }))
}
