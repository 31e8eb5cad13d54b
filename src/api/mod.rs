pub mod cors;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod server;
