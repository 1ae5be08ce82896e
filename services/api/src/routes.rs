use crate::assets::asset_router;
use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Extension, Json};
use gpt_resume::config::StorageConfig;
use gpt_resume::screening::{screening_router, ResumeStore, ScreeningRepository, ScreeningService};
use serde_json::json;
use std::sync::Arc;

/// Everything the binary serves: health, readiness, metrics, admin, API and files.
pub(crate) fn site_router<R, S>(
    service: Arc<ScreeningService<R, S>>,
    storage: &StorageConfig,
) -> axum::Router
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    screening_router(service)
        .route("/", any(health_check))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(asset_router(storage))
}

/// Liveness probe. Answers every method and touches nothing.
pub(crate) async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
