use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::provider::errors::ProviderError;

/// Request-scoped handle on the managed database/auth provider.
///
/// Built fresh for every request and dropped when the handler returns; no
/// session state is kept. The caller-scoped form forwards the request's own
/// `Authorization` header so the provider's row-level security applies to the
/// caller's identity. The service-scoped form uses the privileged role key
/// and must never be reachable from untrusted input paths.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    authorization: String,
}

impl ProviderClient {
    /// Client bound to the caller's forwarded credentials.
    pub fn for_caller(config: &GatewayConfig, http: &reqwest::Client, authorization: &str) -> Self {
        Self {
            http: http.clone(),
            base_url: config.provider_url.clone(),
            api_key: config.anon_key.clone(),
            authorization: authorization.to_string(),
        }
    }

    /// Client bound to the privileged service identity. Bypasses per-row
    /// access control; for administrative writes only.
    pub fn for_service(config: &GatewayConfig, http: &reqwest::Client) -> Self {
        Self {
            http: http.clone(),
            base_url: config.provider_url.clone(),
            api_key: config.service_role_key.clone(),
            authorization: format!("Bearer {}", config.service_role_key),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .header("Authorization", &self.authorization)
    }

    /// Insert a row and return the provider's representation of it.
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Value, ProviderError> {
        debug!(table, "provider insert");
        let response = self
            .request(Method::POST, &format!("/rest/v1/{}", table))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        read_json(response).await
    }

    /// Select rows; `query` is passed straight through as the filter string.
    pub async fn select(&self, table: &str, query: &[(&str, &str)]) -> Result<Value, ProviderError> {
        debug!(table, "provider select");
        let response = self
            .request(Method::GET, &format!("/rest/v1/{}", table))
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }

    /// Invoke a stored procedure exposed by the provider.
    pub async fn rpc(&self, function: &str, args: &Value) -> Result<Value, ProviderError> {
        debug!(function, "provider rpc");
        let response = self
            .request(Method::POST, &format!("/rest/v1/rpc/{}", function))
            .json(args)
            .send()
            .await?;
        read_json(response).await
    }

    /// Probe whether a table is reachable for this client's identity.
    ///
    /// A zero-row select answers without moving data; an unknown relation
    /// comes back as a 404-class rejection rather than an error.
    pub async fn table_exists(&self, table: &str) -> Result<bool, ProviderError> {
        match self.select(table, &[("select", "count"), ("limit", "0")]).await {
            Ok(_) => Ok(true),
            Err(ProviderError::Api { status, .. }) if status == 404 => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Turn a provider response into JSON, mapping non-2xx statuses to
/// [`ProviderError::Api`] with the provider's own `message` preserved.
async fn read_json(response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or(text);
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    if text.is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&text)?)
}
