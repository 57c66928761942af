//! `/v1/token/check`: enforces the middleware's decision.

use axum::{Extension, Json};
use serde_json::{json, Value};

use tokengate_core::{AuthorizationResult, TokenGateError};

use crate::error::ApiError;

pub async fn token_check(
    Extension(result): Extension<AuthorizationResult>,
) -> Result<Json<Value>, ApiError> {
    if !result.authorized {
        return Err(TokenGateError::Unauthorized.into());
    }
    Ok(Json(json!({ "authorized": true })))
}
