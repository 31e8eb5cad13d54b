use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    trace::{Sampler, SdkTracerProvider},
    Resource,
};
use tracing_opentelemetry::OpenTelemetryLayer;

use crate::api::cors::apply_cors;
use crate::api::handlers::{
    credit_balance_handler, list_signals_handler, purchase_signal_handler, schema_probe_handler,
};
use crate::config::{load_secrets_from_manager, GatewayConfig};

/// Shared immutable per-process state. Cloned per request by axum; the
/// reqwest client is itself a cheap handle over a shared connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub http: reqwest::Client,
}

pub fn init_tracing() {
    // Check if we're in Lambda environment
    let is_lambda = env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok();

    let enable_otel = env::var("OTEL_ENABLED")
        .unwrap_or_else(|_| if is_lambda { "true" } else { "false" }.to_string())
        == "true";

    // OTLP endpoint - 127.0.0.1 in case localhost doesn't resolve in Lambda
    let otel_endpoint = if is_lambda {
        "http://127.0.0.1:4318/v1/traces".to_string()
    } else {
        "http://localhost:4318/v1/traces".to_string()
    };

    let subscriber = tracing_subscriber::registry()
        .with(if !enable_otel {
            // JSON format for CloudWatch; span close events carry durations
            Some(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_span_events(fmt::format::FmtSpan::CLOSE),
            )
        } else {
            // When using OTEL, keep basic logging without span events
            Some(fmt::layer().json().with_target(false))
        })
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower=warn,reqwest=warn")),
        );

    if enable_otel {
        match init_opentelemetry(&otel_endpoint) {
            Ok(provider) => {
                opentelemetry::global::set_tracer_provider(provider.clone());
                let tracer = provider.tracer("signal-gateway");
                subscriber.with(OpenTelemetryLayer::new(tracer)).init();
                info!("OpenTelemetry enabled: {}", otel_endpoint);
            }
            Err(e) => {
                tracing::error!(
                    "Failed to initialize OpenTelemetry: {}. Continuing with logs only.",
                    e
                );
                subscriber.init();
            }
        }
    } else {
        subscriber.init();
    }
}

fn init_opentelemetry(endpoint: &str) -> Result<SdkTracerProvider, Box<dyn std::error::Error>> {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "signal-gateway".to_string());

    let sampling_rate = env::var("OTEL_TRACE_SAMPLING_RATE")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.01)
        .clamp(0.0, 1.0);

    let resource = Resource::builder()
        .with_attribute(KeyValue::new("service.name", service_name))
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .with_attribute(KeyValue::new("deployment.environment", environment))
        .build();

    let exporter = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .build()?
    } else {
        SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?
    };

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(Sampler::TraceIdRatioBased(sampling_rate))
        .with_batch_exporter(exporter)
        .build();

    info!("OpenTelemetry sampling rate: {}%", sampling_rate * 100.0);

    Ok(provider)
}

pub async fn create_app() -> Result<Router, Box<dyn std::error::Error>> {
    // Load secrets from AWS Secrets Manager if SIGNAL_GATEWAY_SSM_ARN is set.
    // Runs at startup (Lambda cold start or plain server initialization),
    // before the configuration is read.
    load_secrets_from_manager().await?;

    let config = GatewayConfig::from_env()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let state = AppState {
        config: Arc::new(config),
        http,
    };

    Ok(Router::new()
        // Caller-facing endpoints (forwarded bearer credential)
        .route("/functions/purchase-signal", post(purchase_signal_handler))
        .route("/functions/signals", get(list_signals_handler))
        // Internal endpoints (private ALB, service credential)
        .route("/internal/credit-balance", post(credit_balance_handler))
        .route("/internal/schema/{table}", get(schema_probe_handler))
        // Health check endpoint
        .route("/health", get(health_check))
        .with_state(state)
        // Tracing inside, CORS outermost so every response - including error
        // envelopes - carries the headers and OPTIONS never reaches routing.
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(apply_cors)))
}

async fn health_check() -> &'static str {
    "OK"
}

pub async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    init_tracing();

    info!("Starting signal gateway");

    // Set up ctrl-c handler for graceful shutdown
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        info!("Shutting down gracefully...");
    };

    let app = create_app().await?;

    let port = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
