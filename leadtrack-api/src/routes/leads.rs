/// Lead endpoints
///
/// # Endpoints
///
/// - `GET    /api/leads` - Raw leads (pipeline state `lead`) of the executive
/// - `POST   /api/leads` - Create a lead
/// - `POST   /api/leads/bulk` - Create many leads in one transaction
/// - `GET    /api/leads/:id` - One lead with its course
/// - `PUT    /api/leads/:id` - Partial update
/// - `DELETE /api/leads/:id` - Delete a lead and its comments
/// - `GET    /api/leads/:id/state` - Current pipeline state
/// - `PUT    /api/leads/:id/change-executive` - Reassign to another executive
///
/// Every endpoint accepts `?executive_id=` to act on behalf of another
/// executive, subject to the access gate.

use super::{ExecutiveQuery, MessageResponse};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use leadtrack_shared::{
    auth::{
        authorization::{owner_scope, resolve_executive},
        middleware::AuthContext,
    },
    models::{
        lead::{CreateLead, Lead, LeadSummary, UpdateLead},
        pipeline::{self, PipelineState},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body for creating a single lead
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(max = 255))]
    pub city: Option<String>,

    #[validate(length(max = 64))]
    pub phone: Option<String>,

    pub interest_level: Option<i32>,
    pub course_id: Option<i64>,
}

impl From<CreateLeadRequest> for CreateLead {
    fn from(req: CreateLeadRequest) -> Self {
        Self {
            name: Some(req.name),
            city: req.city,
            phone: req.phone,
            interest_level: req.interest_level,
            course_id: req.course_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLeadResponse {
    pub message: String,
    pub client_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub leads: Vec<CreateLead>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateLeadResponse {
    pub message: String,
    pub lead: Lead,
}

#[derive(Debug, Deserialize)]
pub struct ChangeExecutiveRequest {
    #[serde(alias = "ejecutivoId")]
    pub executive_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeadStateResponse {
    pub client_id: i64,
    pub state: PipelineState,
}

/// Lists the executive's raw leads, newest first
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<Vec<LeadSummary>>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    let leads = pipeline::list_by_state(&state.db, PipelineState::Lead, executive_id).await?;

    Ok(Json(leads))
}

pub async fn get_lead(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(client_id): Path<i64>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<Lead>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    let lead = Lead::get(&state.db, client_id, executive_id).await?;

    Ok(Json(lead))
}

/// Creates a raw lead
///
/// # Errors
///
/// - `400 Bad Request`: Missing name
/// - `403 Forbidden`: Override to another executive not allowed
pub async fn create_lead(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExecutiveQuery>,
    Json(req): Json<CreateLeadRequest>,
) -> ApiResult<(StatusCode, Json<CreateLeadResponse>)> {
    req.validate()?;
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;

    let client_id = Lead::create(&state.db, executive_id, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLeadResponse {
            message: "Lead created successfully".to_string(),
            client_id,
        }),
    ))
}

/// Creates many leads at once
///
/// Missing fields default to empty text, interest 0 and no course. Either
/// all rows are stored or none.
pub async fn create_bulk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExecutiveQuery>,
    Json(req): Json<BulkCreateRequest>,
) -> ApiResult<(StatusCode, Json<BulkCreateResponse>)> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;

    let count = Lead::create_bulk(&state.db, executive_id, req.leads).await?;

    Ok((
        StatusCode::CREATED,
        Json(BulkCreateResponse {
            message: format!("{} leads created successfully", count),
            count,
        }),
    ))
}

pub async fn update_lead(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(client_id): Path<i64>,
    Query(query): Query<ExecutiveQuery>,
    Json(req): Json<UpdateLead>,
) -> ApiResult<Json<UpdateLeadResponse>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    let lead = Lead::update(&state.db, client_id, executive_id, req).await?;

    Ok(Json(UpdateLeadResponse {
        message: "Lead updated successfully".to_string(),
        lead,
    }))
}

pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(client_id): Path<i64>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    Lead::delete(&state.db, client_id, executive_id).await?;

    Ok(Json(MessageResponse::new("Lead deleted successfully")))
}

pub async fn lead_state(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(client_id): Path<i64>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<LeadStateResponse>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    let current = pipeline::classify(&state.db, client_id, executive_id).await?;

    Ok(Json(LeadStateResponse {
        client_id,
        state: current,
    }))
}

/// Hands a lead over to another executive
///
/// Administrators may reassign any lead; other executives only their own.
///
/// # Errors
///
/// - `400 Bad Request`: Target executive does not exist
/// - `404 Not Found`: Lead missing or not owned
pub async fn change_executive(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(client_id): Path<i64>,
    Json(req): Json<ChangeExecutiveRequest>,
) -> ApiResult<Json<MessageResponse>> {
    Lead::reassign(&state.db, client_id, req.executive_id, owner_scope(&auth)).await?;

    Ok(Json(MessageResponse::new("Executive changed successfully")))
}
