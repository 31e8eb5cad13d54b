pub mod client;
pub mod errors;

pub use client::ProviderClient;
pub use errors::ProviderError;
