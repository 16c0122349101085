/// Executive lookups

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use leadtrack_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::executive::{Executive, ExecutiveName, ExecutiveSummary},
};

/// Display name of one executive
pub async fn get_executive(
    State(state): State<AppState>,
    Path(executive_id): Path<i64>,
) -> ApiResult<Json<ExecutiveName>> {
    let executive = Executive::find_name(&state.db, executive_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Executive not found".to_string()))?;

    Ok(Json(executive))
}

/// Every executive; administrators only
pub async fn list_executives(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ExecutiveSummary>>> {
    require_admin(&auth)?;

    let executives = Executive::list(&state.db).await?;
    Ok(Json(executives))
}
