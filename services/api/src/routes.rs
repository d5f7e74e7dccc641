use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use classdesk::attendance::{diff, AttendanceSheet, ChangeSet};
use classdesk::catalog::ClassCatalogImporter;
use classdesk::error::AppError;
use classdesk::transfers::{
    transfer_router, ClassCatalog, ClassSummary, TransferLedger, TransferService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct AttendanceDiffRequest {
    #[serde(default)]
    pub(crate) server: AttendanceSheet,
    #[serde(default)]
    pub(crate) local: AttendanceSheet,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttendanceDiffResponse {
    pub(crate) changed: bool,
    pub(crate) changes: ChangeSet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogPreviewRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogPreviewResponse {
    pub(crate) classes: Vec<ClassSummary>,
}

pub(crate) fn with_transfer_routes<C, L>(service: Arc<TransferService<C, L>>) -> axum::Router
where
    C: ClassCatalog + 'static,
    L: TransferLedger + 'static,
{
    transfer_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/attendance/diff",
            axum::routing::post(attendance_diff_endpoint),
        )
        .route(
            "/api/v1/catalog/preview",
            axum::routing::post(catalog_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
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

pub(crate) async fn attendance_diff_endpoint(
    Json(payload): Json<AttendanceDiffRequest>,
) -> Json<AttendanceDiffResponse> {
    let changes = diff(&payload.server, &payload.local);
    Json(AttendanceDiffResponse {
        changed: !changes.is_empty(),
        changes,
    })
}

/// Parses a class export without touching the running catalog.
pub(crate) async fn catalog_preview_endpoint(
    Json(payload): Json<CatalogPreviewRequest>,
) -> Result<Json<CatalogPreviewResponse>, AppError> {
    let reader = Cursor::new(payload.csv.into_bytes());
    let classes = ClassCatalogImporter::from_reader(reader)?;
    Ok(Json(CatalogPreviewResponse { classes }))
}
