use serde::Serialize;
use serde_json::Value;

/// `{ok: true, purchase}` — the provider's representation of the new row.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub ok: bool,
    pub purchase: Value,
}

/// `{ok: true, signals}` — active signals visible to the caller.
#[derive(Debug, Serialize)]
pub struct SignalsResponse {
    pub ok: bool,
    pub signals: Value,
}

/// `{ok: true, result}` — outcome of the privileged credit RPC.
#[derive(Debug, Serialize)]
pub struct CreditBalanceResponse {
    pub ok: bool,
    pub result: Value,
}

/// `{ok: true, table, exists}` — schema probe outcome.
#[derive(Debug, Serialize)]
pub struct SchemaProbeResponse {
    pub ok: bool,
    pub table: String,
    pub exists: bool,
}
