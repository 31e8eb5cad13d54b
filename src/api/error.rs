use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::api::envelope;
use crate::domain::validation::ValidationError;
use crate::provider::ProviderError;

/// Gateway-level error taxonomy. Every variant maps to a fixed machine code
/// and HTTP status; the human detail rides in the envelope's `detail` field.
#[derive(Debug)]
pub enum GatewayError {
    BadRequest(String),
    Validation(ValidationError),
    Unauthorized(String),
    Provider(ProviderError),
    Internal(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            GatewayError::Validation(e) => write!(f, "Validation error: {}", e),
            GatewayError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            GatewayError::Provider(e) => write!(f, "Provider error: {}", e),
            GatewayError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Provider(e) => match e.status() {
                // Client-caused provider rejections stay 400-class; anything
                // else is the provider failing us.
                Some(status) if status.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            GatewayError::BadRequest(_) => "BAD_REQUEST",
            GatewayError::Validation(e) => e.code(),
            GatewayError::Unauthorized(_) => "UNAUTHORIZED",
            GatewayError::Provider(_) => "PROVIDER_ERROR",
            GatewayError::Internal(_) => "SERVER_ERROR",
        }
    }

    fn detail(&self) -> String {
        match self {
            GatewayError::BadRequest(msg) => msg.clone(),
            GatewayError::Validation(e) => e.to_string(),
            GatewayError::Unauthorized(msg) => msg.clone(),
            // The provider's own message is preserved, never swallowed.
            GatewayError::Provider(e) => e.to_string(),
            GatewayError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::warn!(code = self.code(), detail = %self.detail(), "request failed");
        // Origin is unknown at this point; the CORS middleware stamps the
        // request's actual origin onto this response on the way out.
        envelope::err(self.code(), self.status(), Some(&self.detail()), None)
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        GatewayError::Validation(err)
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        GatewayError::Provider(err)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Internal(format!("JSON error: {}", err))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
