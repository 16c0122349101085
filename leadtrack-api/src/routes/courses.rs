/// Course catalog endpoints
///
/// Courses are shared by all executives.
///
/// - `GET    /api/courses` - List, most recent date first
/// - `POST   /api/courses` - Create (date defaults to today)
/// - `PUT    /api/courses/:id` - Replace name and date
/// - `DELETE /api/courses/:id` - Delete a course no lead references

use super::MessageResponse;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use leadtrack_shared::models::course::{Course, CreateCourse};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 255, message = "Course name is required"))]
    pub name: String,

    pub course_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 255, message = "Course name is required"))]
    pub name: String,

    pub course_date: NaiveDate,
}

pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    let courses = Course::list(&state.db).await?;
    Ok(Json(courses))
}

pub async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    req.validate()?;

    let course = Course::create(
        &state.db,
        CreateCourse {
            name: req.name,
            course_date: req.course_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Json(req): Json<UpdateCourseRequest>,
) -> ApiResult<Json<Course>> {
    req.validate()?;

    let course = Course::update(&state.db, course_id, &req.name, req.course_date)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

/// Deletes a course
///
/// Deleting a course that leads still reference fails with a server error;
/// the leads keep their course.
pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !Course::delete(&state.db, course_id).await? {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    tracing::info!(course_id, "Course deleted");
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}
