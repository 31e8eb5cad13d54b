// Caller-facing handlers - require the caller's own bearer credential, so
// row-level security at the provider applies to the caller's identity.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::Value;
use tracing::info;

use crate::api::cors::request_origin;
use crate::api::error::{GatewayError, GatewayResult};
use crate::api::envelope;
use crate::api::server::AppState;
use crate::auth::require_authorization;
use crate::domain::validation::{
    validate_amount, validate_enum, validate_required_fields, Currency,
};
use crate::models::purchase::{NormalizedAmount, PurchaseRecord};
use crate::models::responses::{PurchaseResponse, SignalsResponse};
use crate::provider::ProviderClient;

const CURRENCIES: &[&str] = &["USD", "USDT"];
const PAYMENT_METHODS: &[&str] = &["balance", "wallet"];

/// POST /functions/purchase-signal
/// Validates the purchase payload, then inserts a normalized purchase row
/// under the caller's identity.
#[tracing::instrument(skip(state, headers, body), fields(endpoint = "purchase_signal"))]
pub async fn purchase_signal_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> GatewayResult<Response> {
    let origin = request_origin(&headers).map(str::to_owned);

    // 1. Validation - all of it before any network call
    let payload = parse_json_body(&body)?;
    validate_required_fields(&payload, &["signal_id", "amount", "currency"])?;

    let currency_text = field_text(&payload, "currency");
    validate_enum(&currency_text, CURRENCIES, "currency")?;
    let currency: Currency = currency_text.parse()?;

    let payment_method = optional_field_text(&payload, "payment_method");
    if let Some(method) = payment_method.as_deref() {
        validate_enum(method, PAYMENT_METHODS, "payment_method")?;
    }

    let amount = validate_amount(&field_text(&payload, "amount"), currency)?;

    // 2. Authentication - forwarded bearer, checked before the provider call
    let authorization = require_authorization(&headers)?;

    info!(currency = %currency, "purchase payload validated");

    // 3. Provider call with a request-scoped, caller-bound client
    let client = ProviderClient::for_caller(&state.config, &state.http, authorization);
    let record = PurchaseRecord {
        signal_id: field_text(&payload, "signal_id"),
        amount: NormalizedAmount::new(amount, currency),
        currency,
        payment_method,
        purchased_at: chrono::Utc::now(),
    };
    let purchase = client
        .insert("signal_purchases", &serde_json::to_value(&record)?)
        .await?;

    // 4. Respond through the envelope
    Ok(envelope::json(
        &PurchaseResponse { ok: true, purchase },
        StatusCode::OK,
        origin.as_deref(),
    ))
}

/// GET /functions/signals
/// Lists active signals visible to the caller.
#[tracing::instrument(skip(state, headers), fields(endpoint = "list_signals"))]
pub async fn list_signals_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Response> {
    let origin = request_origin(&headers).map(str::to_owned);

    let authorization = require_authorization(&headers)?;

    let client = ProviderClient::for_caller(&state.config, &state.http, authorization);
    let signals = client
        .select("signals", &[("select", "*"), ("active", "eq.true")])
        .await?;

    Ok(envelope::json(
        &SignalsResponse { ok: true, signals },
        StatusCode::OK,
        origin.as_deref(),
    ))
}

/// Parse the raw request body as a JSON object.
pub(crate) fn parse_json_body(body: &Bytes) -> Result<Value, GatewayError> {
    if body.is_empty() {
        // An absent body validates like an empty object: every required
        // field is reported missing rather than a parse failure.
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Text form of a JSON field: strings pass through, numbers are rendered
/// losslessly, anything else validates as empty.
pub(crate) fn field_text(payload: &Value, name: &str) -> String {
    match payload.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn optional_field_text(payload: &Value, name: &str) -> Option<String> {
    match payload.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_body_empty_is_empty_object() {
        let payload = parse_json_body(&Bytes::new()).unwrap();
        assert!(payload.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_parse_json_body_rejects_garbage() {
        let result = parse_json_body(&Bytes::from_static(b"{not json"));
        assert!(matches!(result, Err(GatewayError::BadRequest(_))));
    }

    #[test]
    fn test_field_text_accepts_string_and_number_amounts() {
        let payload = json!({"amount": "12.34", "other": 56.7});
        assert_eq!(field_text(&payload, "amount"), "12.34");
        assert_eq!(field_text(&payload, "other"), "56.7");
        assert_eq!(field_text(&payload, "missing"), "");
    }
}
