use axum::http::HeaderMap;

use crate::api::error::GatewayError;

/// Extract and shape-check the caller's `Authorization` header.
///
/// The token itself is opaque to this layer; the provider verifies it and
/// applies row-level security. Absence or a malformed header is surfaced
/// before any provider call is made.
pub fn require_authorization(headers: &HeaderMap) -> Result<&str, GatewayError> {
    let value = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| GatewayError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        GatewayError::Unauthorized(
            "Invalid Authorization header format, expected 'Bearer <token>'".to_string(),
        )
    })?;

    if token.trim().is_empty() {
        return Err(GatewayError::Unauthorized(
            "Empty bearer token".to_string(),
        ));
    }

    Ok(value)
}
