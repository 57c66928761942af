//! HTTP mapping for `TokenGateError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tokengate_core::TokenGateError;

/// Wrapper so gateway handlers can return core errors.
#[derive(Debug)]
pub struct ApiError(pub TokenGateError);

impl From<TokenGateError> for ApiError {
    fn from(e: TokenGateError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match &self.0 {
            TokenGateError::BadRequest(_) | TokenGateError::UnsupportedVersion => StatusCode::BAD_REQUEST,
            TokenGateError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        // no detail beyond the code for clients
        let body = Json(json!({ "error": code.as_str() }));
        (status, body).into_response()
    }
}
