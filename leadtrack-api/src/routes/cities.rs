/// City lookups used to populate filter dropdowns

use super::ExecutiveQuery;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use leadtrack_shared::{
    auth::{authorization::resolve_executive, middleware::AuthContext},
    models::{lead::Lead, pipeline::PipelineState},
};

/// Distinct cities across all of the executive's leads
pub async fn list_cities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    let cities = Lead::distinct_cities(&state.db, executive_id, None).await?;

    Ok(Json(cities))
}

/// Distinct cities of the leads in one pipeline state
///
/// `state` is a URL slug: `leads`, `enrolled`, `bulk-contacted` or `declined`.
pub async fn list_cities_in_state(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let pipeline_state = PipelineState::from_slug(&slug)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown pipeline state: {}", slug)))?;
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;

    let cities = Lead::distinct_cities(&state.db, executive_id, Some(pipeline_state)).await?;

    Ok(Json(cities))
}
