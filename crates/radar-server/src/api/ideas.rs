use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use radar_db::IdeaRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct IdeaListQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct IdeaItem {
    id: Uuid,
    cluster_id: Uuid,
    idea_type: String,
    idea_name: String,
    description: String,
    icp: String,
    revenue_model: String,
    mvp_features: Vec<String>,
    pricing_estimate: String,
    pain_intensity: i32,
    frequency: i32,
    budget_size: i32,
    competition_level: i32,
    speed_to_mvp: i32,
    scalability: i32,
    final_score: f64,
    execution_roadmap: String,
    tech_stack: String,
    gtm_strategy: String,
    launch_plan_30d: String,
    created_at: DateTime<Utc>,
}

impl From<IdeaRow> for IdeaItem {
    fn from(row: IdeaRow) -> Self {
        Self {
            id: row.id,
            cluster_id: row.cluster_id,
            idea_type: row.idea_type,
            idea_name: row.idea_name,
            description: row.description,
            icp: row.icp,
            revenue_model: row.revenue_model,
            mvp_features: row.mvp_features.0,
            pricing_estimate: row.pricing_estimate,
            pain_intensity: row.pain_intensity,
            frequency: row.frequency,
            budget_size: row.budget_size,
            competition_level: row.competition_level,
            speed_to_mvp: row.speed_to_mvp,
            scalability: row.scalability,
            final_score: row.final_score,
            execution_roadmap: row.execution_roadmap,
            tech_stack: row.tech_stack,
            gtm_strategy: row.gtm_strategy,
            launch_plan_30d: row.launch_plan_30d,
            created_at: row.created_at,
        }
    }
}

/// Top ideas across all clusters, best score first.
pub(super) async fn list_ideas(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<IdeaListQuery>,
) -> Result<Json<ApiResponse<Vec<IdeaItem>>>, ApiError> {
    let rows = radar_db::list_top_ideas(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(IdeaItem::from).collect();
    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn get_idea(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<ApiResponse<IdeaItem>>, ApiError> {
    let row = radar_db::get_idea(&state.pool, idea_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(IdeaItem::from(row), req_id.0))
}
