/// Pipeline collection endpoints
///
/// Mounted once per named state (`/api/enrolled`, `/api/bulk-contacted`,
/// `/api/declined`); the router supplies the state as a request extension.
///
/// - `GET    /` - Leads currently in the state
/// - `POST   /` - Move a raw lead into the state (`{"client_id": 1}`)
/// - `POST   /new` - Create a lead directly in the state
/// - `DELETE /:client_id` - Return the lead to the raw `lead` state

use super::{leads::{CreateLeadRequest, CreateLeadResponse}, ExecutiveQuery, MessageResponse};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use leadtrack_shared::{
    auth::{authorization::resolve_executive, middleware::AuthContext},
    models::{
        lead::{Lead, LeadSummary},
        pipeline::{self, PipelineState},
    },
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct MoveLeadRequest {
    #[serde(alias = "clienteId")]
    pub client_id: i64,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(pipeline_state): Extension<PipelineState>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<Vec<LeadSummary>>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    let leads = pipeline::list_by_state(&state.db, pipeline_state, executive_id).await?;

    Ok(Json(leads))
}

/// Moves a raw lead into this collection
///
/// # Errors
///
/// - `404 Not Found`: Lead missing or not owned
/// - `409 Conflict`: Lead already here, or in another named state
pub async fn move_lead(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(pipeline_state): Extension<PipelineState>,
    Query(query): Query<ExecutiveQuery>,
    Json(req): Json<MoveLeadRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    pipeline::move_to(&state.db, req.client_id, pipeline_state, executive_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Lead moved to {}",
            pipeline_state
        ))),
    ))
}

pub async fn create_in_state(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(pipeline_state): Extension<PipelineState>,
    Query(query): Query<ExecutiveQuery>,
    Json(req): Json<CreateLeadRequest>,
) -> ApiResult<(StatusCode, Json<CreateLeadResponse>)> {
    req.validate()?;
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;

    let client_id =
        Lead::create_in_state(&state.db, executive_id, req.into(), pipeline_state).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLeadResponse {
            message: format!("Lead created in {}", pipeline_state),
            client_id,
        }),
    ))
}

/// Returns a lead from this collection to the raw `lead` state
///
/// A lead that is not currently in the collection yields `404 Not Found`.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(pipeline_state): Extension<PipelineState>,
    Path(client_id): Path<i64>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    pipeline::remove_from(&state.db, client_id, pipeline_state, executive_id).await?;

    Ok(Json(MessageResponse::new(format!(
        "Lead removed from {}",
        pipeline_state
    ))))
}
