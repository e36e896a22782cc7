//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : last finished poll cycle, Prometheus text format

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::backend::PrometheusBackend;

pub fn build_router(prom: Arc<PrometheusBackend>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(prom)
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(prom): State<Arc<PrometheusBackend>>) -> Response {
    let body = prom.render().to_string();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
