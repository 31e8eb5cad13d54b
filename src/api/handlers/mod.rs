// API handlers - thin HTTP orchestration layer
// Handlers only deal with HTTP concerns:
// 1. Short-circuit preflight (done by the router-level CORS middleware)
// 2. Validate the payload with the pure domain validators
// 3. Build a request-scoped provider client
// 4. Make the one provider call and wrap the result in the envelope

pub mod internal;
pub mod purchase;

pub use internal::{credit_balance_handler, schema_probe_handler};
pub use purchase::{list_signals_handler, purchase_signal_handler};
