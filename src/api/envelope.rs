//! Uniform JSON response envelope.
//!
//! Every response this layer produces is `{ok, ...}`; failures carry a
//! machine `error` code and, when there is one, a human-readable `detail`.
//! CORS headers are attached here as well as in the router middleware, so a
//! response built directly by a handler is complete on its own.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::cors::cors_headers;

/// Body shape for failures: `{ok: false, error, detail?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Serialize `data` as a JSON response with CORS headers for `origin`.
pub fn json<T: Serialize>(data: &T, status: StatusCode, origin: Option<&str>) -> Response {
    let body = match serde_json::to_string(data) {
        Ok(body) => body,
        // Serialization of our own response types failing is a programming
        // error; still answer with a well-formed envelope.
        Err(e) => {
            return err(
                "SERVER_ERROR",
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(&format!("response serialization failed: {}", e)),
                origin,
            )
        }
    };

    let mut response = (status, body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response.headers_mut().extend(cors_headers(origin));
    response
}

/// Build a `{ok:false, error, detail?}` response. Defaults callers should
/// pass: status 400 for client errors. Empty detail strings are dropped so
/// `detail` never appears without content.
pub fn err(code: &str, status: StatusCode, detail: Option<&str>, origin: Option<&str>) -> Response {
    let body = ErrorBody {
        ok: false,
        error: code.to_string(),
        detail: detail.filter(|d| !d.is_empty()).map(str::to_owned),
    };
    json(&body, status, origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json as json_value;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_sets_status_content_type_and_cors() {
        let response = json(
            &json_value!({"ok": true, "value": 7}),
            StatusCode::OK,
            Some("http://localhost:3000"),
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:3000"
        );

        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["value"], 7);
    }

    #[tokio::test]
    async fn test_err_envelope_shape() {
        let response = err(
            "MISSING_FIELDS",
            StatusCode::BAD_REQUEST,
            Some("Missing required fields: amount"),
            None,
        );

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );

        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "MISSING_FIELDS");
        assert_eq!(body["detail"], "Missing required fields: amount");
    }

    #[tokio::test]
    async fn test_err_drops_empty_detail() {
        let response = err("SERVER_ERROR", StatusCode::INTERNAL_SERVER_ERROR, Some(""), None);
        let body = body_json(response).await;
        assert_eq!(body["error"], "SERVER_ERROR");
        assert!(body.get("detail").is_none());
    }
}
