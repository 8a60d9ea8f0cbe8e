//! HTTP surface.
//!
//! Three fixed routes plus one dynamic dispatch route: every operation is a
//! `POST /{operation}` with a JSON parameter object. The envelope decides
//! the body; only internal failures change the status code, so agent
//! callers always get the error in-band.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::{Envelope, OperationRegistry, Services};
use crate::config::ServerConfig;
use crate::ports::HealthProbe;

/// Everything a route handler needs, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub registry: Arc<OperationRegistry>,
    pub health: Arc<dyn HealthProbe>,
    pub budget: Duration,
}

impl AppState {
    pub fn new(
        services: Services,
        registry: Arc<OperationRegistry>,
        health: Arc<dyn HealthProbe>,
        budget: Duration,
    ) -> Self {
        Self { services, registry, health, budget }
    }
}

/// Monotonic per-process request ids; enough to correlate log lines.
#[derive(Clone, Default)]
struct CounterRequestId {
    counter: Arc<AtomicU64>,
}

impl MakeRequestId for CounterRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        HeaderValue::from_str(&id.to_string()).ok().map(RequestId::new)
    }
}

/// Builds the full application router.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let cors = match server.cors_origins_list().as_slice() {
        [] => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
        origins => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
        }
    };

    // The outer timeout sits above the dispatcher's soft budget so a stuck
    // handler still gets a DeadlineExceeded envelope before the socket dies.
    let hard_timeout = Duration::from_secs(server.request_timeout_secs + 5);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/service-info", get(service_info))
        .route("/:operation", post(dispatch))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(CounterRequestId::default()))
        .layer(TimeoutLayer::new(hard_timeout))
        .layer(cors)
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "operations": state.registry.len(),
    }))
}

async fn health(State(state): State<AppState>) -> Response {
    let database_up = state.health.ping().await;
    let healthy = database_up && !state.registry.is_empty();
    let body = json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "database": if database_up { "up" } else { "down" },
        "services": state.registry.len(),
        "timestamp": Utc::now().to_rfc3339(),
    });
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(body)).into_response()
}

async fn service_info(State(state): State<AppState>) -> Json<Value> {
    let aliases: serde_json::Map<String, Value> = state
        .registry
        .alias_table()
        .into_iter()
        .map(|(alias, canonical)| (alias.to_string(), Value::String(canonical.to_string())))
        .collect();
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "operations": state.registry.operation_names(),
        "aliases": aliases,
        "categories": state.registry.category_counts(),
    }))
}

async fn dispatch(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    payload: Option<Json<Value>>,
) -> Response {
    let params = payload.map(|Json(v)| v).unwrap_or(Value::Null);
    let envelope = state
        .registry
        .dispatch(&state.services, &operation, params, state.budget)
        .await;
    (status_for(&envelope), Json(envelope)).into_response()
}

/// Every operation envelope rides a 200, success or domain error, so
/// envelope-aware callers never have to branch on the status code. Only an
/// internal failure is a transport-level 500.
fn status_for(envelope: &Envelope) -> StatusCode {
    match envelope {
        Envelope::Success { .. } => StatusCode::OK,
        Envelope::Error { code, .. } => match code.as_deref() {
            Some("Internal") => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};

    #[test]
    fn domain_error_envelopes_ride_200() {
        assert_eq!(status_for(&Envelope::success(json!({}))), StatusCode::OK);
        for (code, message) in [
            (ErrorCode::UnknownOperation, "Unknown operation 'x'"),
            (ErrorCode::DeadlineExceeded, "Operation 'x' exceeded the request budget"),
            (ErrorCode::BookingNotFound, "No booking with reference 'ABC123'"),
        ] {
            let envelope = Envelope::from_error(&DomainError::new(code, message));
            assert_eq!(status_for(&envelope), StatusCode::OK, "{:?}", code);
        }
    }

    #[test]
    fn internal_failures_are_500() {
        let internal = Envelope::from_error(&DomainError::internal("boom"));
        assert_eq!(status_for(&internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn request_ids_are_monotonic() {
        let mut make = CounterRequestId::default();
        let req = Request::builder().body(()).unwrap();
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
