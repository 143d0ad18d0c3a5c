use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// A successful reply. The body is serialized as-is, without an envelope, so
/// clients receive the resource (or list of resources) directly.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    body: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
        }
    }

    /// 201 Created
    pub fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Some(body),
        }
    }

    #[cfg(test)]
    fn status(&self) -> StatusCode {
        self.status
    }
}

impl ApiResponse<()> {
    /// 204 No Content
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let Some(body) = self.body else {
            return self.status.into_response();
        };

        match serde_json::to_value(&body) {
            Ok(value) => (self.status, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                ApiError::internal_server_error("Failed to serialize response body").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
