use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use radar_core::{AdminFilter, AdminFilterUpdate};
use radar_engine::PipelineSummary;
use serde::Serialize;

use super::{map_db_error, map_pipeline_error, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct TrendStatus {
    status: &'static str,
}

pub(super) async fn run_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<PipelineSummary>>, ApiError> {
    match state.runner.run_full_pipeline().await {
        Some(Ok(summary)) => Ok(ApiResponse::new(summary, req_id.0)),
        Some(Err(e)) => Err(map_pipeline_error(req_id.0, &e)),
        None => Err(ApiError::new(
            req_id.0,
            "conflict",
            "a pipeline run is already in progress",
        )),
    }
}

pub(super) async fn recalculate_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<TrendStatus>>, ApiError> {
    match state.runner.recalculate_trends().await {
        Some(Ok(_)) => Ok(ApiResponse::new(TrendStatus { status: "ok" }, req_id.0)),
        Some(Err(e)) => Err(map_pipeline_error(req_id.0, &e)),
        None => Err(ApiError::new(
            req_id.0,
            "conflict",
            "a trend refresh is already in progress",
        )),
    }
}

pub(super) async fn get_filters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<AdminFilter>>, ApiError> {
    let defaults = state.runner.orchestrator().settings().default_filter();
    let mut conn = state.pool.acquire().await.map_err(|e| {
        tracing::error!(error = %e, "failed to acquire connection");
        ApiError::new(req_id.0.clone(), "internal_error", "database query failed")
    })?;

    let filter = radar_db::get_or_create_admin_filter(&mut conn, &defaults)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(filter, req_id.0))
}

pub(super) async fn put_filters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AdminFilterUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<AdminFilter>>, ApiError> {
    let Json(update) = payload
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;
    let filter = update
        .validate()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let mut conn = state.pool.acquire().await.map_err(|e| {
        tracing::error!(error = %e, "failed to acquire connection");
        ApiError::new(req_id.0.clone(), "internal_error", "database query failed")
    })?;

    let saved = radar_db::replace_admin_filter(&mut conn, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(geo_scope = %saved.geo_scope, "admin filter replaced");
    Ok(ApiResponse::new(saved, req_id.0))
}
