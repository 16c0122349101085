/// Comment endpoints
///
/// Comments hang off a lead; all operations require the lead to belong to
/// the resolved executive.

use super::{ExecutiveQuery, MessageResponse};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use leadtrack_shared::{
    auth::{authorization::resolve_executive, middleware::AuthContext},
    models::comment::Comment,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[serde(alias = "clienteId")]
    pub client_id: i64,

    #[validate(length(min = 1, message = "Comment text is required"))]
    pub text: String,
}

/// All comments of a lead, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(client_id): Path<i64>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    let comments = Comment::list_for_lead(&state.db, client_id, executive_id).await?;

    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExecutiveQuery>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;

    let comment = Comment::create(&state.db, req.client_id, executive_id, &req.text).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(comment_id): Path<i64>,
    Query(query): Query<ExecutiveQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let executive_id = resolve_executive(&auth, query.executive_id, &state.access_policy())?;
    Comment::delete(&state.db, comment_id, executive_id).await?;

    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}
