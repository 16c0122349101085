/// Multi-criteria lead search
///
/// `POST /api/filter` with a JSON body; every criterion is optional and the
/// present ones are combined with `AND`:
///
/// ```json
/// {
///   "city": "Santiago",
///   "course_id": 3,
///   "interest_level": 2,
///   "created_from": "2024-01-01",
///   "created_to": "2024-03-31",
///   "status": "enrolled"
/// }
/// ```
///
/// An `executive_id` in the body goes through the access gate like the
/// query parameter on other endpoints.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use leadtrack_shared::{
    auth::{authorization::resolve_executive, middleware::AuthContext},
    models::{lead::LeadSummary, lead_filter::LeadFilter},
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct FilterRequest {
    #[serde(flatten)]
    pub criteria: LeadFilter,

    #[serde(alias = "ejecutivoId")]
    pub executive_id: Option<i64>,
}

pub async fn filter_leads(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<FilterRequest>,
) -> ApiResult<Json<Vec<LeadSummary>>> {
    let executive_id = resolve_executive(&auth, req.executive_id, &state.access_policy())?;
    let leads = req.criteria.execute(&state.db, executive_id).await?;

    Ok(Json(leads))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadtrack_shared::models::pipeline::PipelineState;

    #[test]
    fn test_filter_request_deserialization() {
        let req: FilterRequest = serde_json::from_str(
            r#"{"city": "Talca", "interest_level": 0, "status": "bulk_contacted", "executive_id": 4}"#,
        )
        .unwrap();

        assert_eq!(req.executive_id, Some(4));
        assert_eq!(req.criteria.city.as_deref(), Some("Talca"));
        assert_eq!(req.criteria.interest_level, Some(0));
        assert_eq!(req.criteria.status, Some(PipelineState::BulkContacted));
        assert_eq!(req.criteria.course_id, None);
    }

    #[test]
    fn test_empty_filter_request() {
        let req: FilterRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.executive_id, None);
        assert_eq!(req.criteria, LeadFilter::default());
    }
}
