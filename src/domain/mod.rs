// Domain layer - pure request validation with no HTTP or provider concerns.
// Everything here is synchronous and side-effect free so handlers can
// short-circuit before any network call.

pub mod validation;

pub use validation::{
    round_usd, round_usdt, validate_amount, validate_enum, validate_required_fields, Currency,
    ValidationError,
};
