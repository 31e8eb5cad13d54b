pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod models;
pub mod provider;

// Re-export commonly used types
pub use config::GatewayConfig;

pub use api::error::{GatewayError, GatewayResult};

pub use domain::validation::{
    round_usd, round_usdt, validate_amount, validate_enum, validate_required_fields, Currency,
    ValidationError,
};

pub use provider::{ProviderClient, ProviderError};
