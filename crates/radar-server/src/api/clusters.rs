use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use radar_db::{ClusterRow, PainRow, PostRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ideas::IdeaItem, map_db_error, normalize_limit, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ClusterListQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ClusterItem {
    id: Uuid,
    name: String,
    summary: String,
    avg_urgency: f64,
    post_count: i32,
    trend_7d: i32,
    trend_30d: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClusterRow> for ClusterItem {
    fn from(row: ClusterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            summary: row.summary,
            avg_urgency: row.avg_urgency,
            post_count: row.post_count,
            trend_7d: row.trend_7d,
            trend_30d: row.trend_30d,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PainItem {
    id: Uuid,
    post_id: Uuid,
    pain_point: String,
    target_user: String,
    urgency_score: i32,
    willingness_to_pay: i32,
    existing_solutions: Vec<String>,
    geo_scope: String,
    industry: String,
    created_at: DateTime<Utc>,
}

impl From<PainRow> for PainItem {
    fn from(row: PainRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            pain_point: row.pain_point,
            target_user: row.target_user,
            urgency_score: row.urgency_score,
            willingness_to_pay: row.willingness_to_pay,
            existing_solutions: row.existing_solutions.0,
            geo_scope: row.geo_scope,
            industry: row.industry,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PostItem {
    id: Uuid,
    platform: String,
    title: String,
    content: String,
    upvotes: i32,
    comments: i32,
    url: String,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for PostItem {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            platform: row.platform,
            title: row.title,
            content: row.content,
            upvotes: row.upvotes,
            comments: row.comments,
            url: row.url,
            created_at: row.created_at,
        }
    }
}

/// A cluster with its member pains (most urgent first), the posts they came
/// from (newest first) and its ideas (best first).
#[derive(Debug, Serialize)]
pub(super) struct ClusterDetail {
    cluster: ClusterItem,
    pains: Vec<PainItem>,
    posts: Vec<PostItem>,
    ideas: Vec<IdeaItem>,
}

pub(super) async fn list_clusters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ClusterListQuery>,
) -> Result<Json<ApiResponse<Vec<ClusterItem>>>, ApiError> {
    let rows = radar_db::list_clusters(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(ClusterItem::from).collect();
    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn get_cluster(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(cluster_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClusterDetail>>, ApiError> {
    let cluster = radar_db::get_cluster(&state.pool, cluster_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let pains = radar_db::list_cluster_pains_by_urgency(&state.pool, cluster_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let posts = radar_db::list_cluster_posts(&state.pool, cluster_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let ideas = radar_db::list_cluster_ideas(&state.pool, cluster_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = ClusterDetail {
        cluster: cluster.into(),
        pains: pains.into_iter().map(PainItem::from).collect(),
        posts: posts.into_iter().map(PostItem::from).collect(),
        ideas: ideas.into_iter().map(IdeaItem::from).collect(),
    };
    Ok(ApiResponse::new(data, req_id.0))
}
