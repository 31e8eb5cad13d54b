use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ProviderError {
    /// HTTP status reported by the provider, when the failure carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Api { status, .. } => StatusCode::from_u16(*status).ok(),
            ProviderError::Transport(e) => e.status().map(|s| {
                StatusCode::from_u16(s.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
            }),
            ProviderError::Decode(_) => None,
        }
    }
}
