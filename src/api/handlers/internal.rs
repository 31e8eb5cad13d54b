// Internal handlers - deployed behind a private load balancer, no caller
// authentication. These use the privileged service client and must never be
// routed from public ingress.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::json;
use tracing::info;

use crate::api::cors::request_origin;
use crate::api::envelope;
use crate::api::error::{GatewayError, GatewayResult};
use crate::api::handlers::purchase::{field_text, parse_json_body};
use crate::api::server::AppState;
use crate::domain::validation::{
    validate_amount, validate_enum, validate_required_fields, Currency,
};
use crate::models::purchase::NormalizedAmount;
use crate::models::responses::{CreditBalanceResponse, SchemaProbeResponse};
use crate::provider::ProviderClient;

const CURRENCIES: &[&str] = &["USD", "USDT"];

/// POST /internal/credit-balance
/// Credits a user's balance through the provider's `credit_balance` RPC.
/// Service-scoped: bypasses row-level security by design.
#[tracing::instrument(skip(state, headers, body), fields(endpoint = "credit_balance"))]
pub async fn credit_balance_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> GatewayResult<Response> {
    let origin = request_origin(&headers).map(str::to_owned);

    let payload = parse_json_body(&body)?;
    validate_required_fields(&payload, &["user_id", "amount", "currency"])?;

    let currency_text = field_text(&payload, "currency");
    validate_enum(&currency_text, CURRENCIES, "currency")?;
    let currency: Currency = currency_text.parse()?;

    let amount = validate_amount(&field_text(&payload, "amount"), currency)?;

    info!(currency = %currency, "credit payload validated");

    let client = ProviderClient::for_service(&state.config, &state.http);
    let result = client
        .rpc(
            "credit_balance",
            &json!({
                "user_id": field_text(&payload, "user_id"),
                "amount": NormalizedAmount::new(amount, currency),
                "currency": currency,
            }),
        )
        .await?;

    Ok(envelope::json(
        &CreditBalanceResponse { ok: true, result },
        StatusCode::OK,
        origin.as_deref(),
    ))
}

/// GET /internal/schema/{table}
/// Probes whether a table exists and is reachable for the service identity.
#[tracing::instrument(skip(state, headers), fields(table = %table))]
pub async fn schema_probe_handler(
    Path(table): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> GatewayResult<Response> {
    let origin = request_origin(&headers).map(str::to_owned);

    if !is_valid_table_name(&table) {
        return Err(GatewayError::BadRequest(format!(
            "Invalid table name: {}",
            table
        )));
    }

    let client = ProviderClient::for_service(&state.config, &state.http);
    let exists = client.table_exists(&table).await?;

    info!(exists, "schema probe completed");

    Ok(envelope::json(
        &SchemaProbeResponse {
            ok: true,
            table,
            exists,
        },
        StatusCode::OK,
        origin.as_deref(),
    ))
}

/// Table names are plain SQL identifiers; anything else never reaches the
/// provider.
fn is_valid_table_name(table: &str) -> bool {
    !table.is_empty()
        && table.len() <= 63
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit())
}
