/// Aggregate counts for the dashboard
///
/// The executive is part of the path; it still passes through the access
/// gate, so a standard executive can only read their own numbers.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use leadtrack_shared::{
    auth::{authorization::resolve_executive, middleware::AuthContext},
    models::{
        pipeline::PipelineState,
        stats::{self, CityCount, CourseCount},
    },
};

/// Enrolled leads per course
pub async fn by_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(executive_id): Path<i64>,
) -> ApiResult<Json<Vec<CourseCount>>> {
    let executive_id = resolve_executive(&auth, Some(executive_id), &state.access_policy())?;
    let counts = stats::by_course(&state.db, executive_id).await?;

    Ok(Json(counts))
}

/// Bulk-contacted leads per city
pub async fn by_city_bulk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(executive_id): Path<i64>,
) -> ApiResult<Json<Vec<CityCount>>> {
    city_counts(&state, &auth, executive_id, PipelineState::BulkContacted).await
}

/// Declined leads per city
pub async fn by_city_declined(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(executive_id): Path<i64>,
) -> ApiResult<Json<Vec<CityCount>>> {
    city_counts(&state, &auth, executive_id, PipelineState::Declined).await
}

async fn city_counts(
    state: &AppState,
    auth: &AuthContext,
    executive_id: i64,
    pipeline_state: PipelineState,
) -> ApiResult<Json<Vec<CityCount>>> {
    let executive_id = resolve_executive(auth, Some(executive_id), &state.access_policy())?;
    let counts = stats::by_city(&state.db, executive_id, pipeline_state).await?;

    Ok(Json(counts))
}
