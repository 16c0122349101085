/// Per-executive statistics
///
/// Counts of worked leads grouped by course (enrolled leads) or by city
/// (any named state).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::pipeline::PipelineState;

/// Enrolled leads for one course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseCount {
    pub course_name: String,
    pub count: i64,
    pub course_date: NaiveDate,
}

/// Leads in one city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CityCount {
    pub city: String,
    pub count: i64,
}

/// Enrolled leads per course, most recent course first
pub async fn by_course(pool: &PgPool, executive_id: i64) -> Result<Vec<CourseCount>, sqlx::Error> {
    sqlx::query_as::<_, CourseCount>(
        r#"
        SELECT c.name AS course_name, COUNT(*) AS count, c.course_date
        FROM leads l
        JOIN courses c ON c.course_id = l.course_id
        WHERE l.executive_id = $1 AND l.pipeline_state = 'enrolled'
        GROUP BY c.course_id, c.name, c.course_date
        ORDER BY c.course_date DESC, c.name
        "#,
    )
    .bind(executive_id)
    .fetch_all(pool)
    .await
}

/// Leads per city in `state`, ordered by city
pub async fn by_city(
    pool: &PgPool,
    executive_id: i64,
    state: PipelineState,
) -> Result<Vec<CityCount>, sqlx::Error> {
    sqlx::query_as::<_, CityCount>(
        r#"
        SELECT city, COUNT(*) AS count
        FROM leads
        WHERE executive_id = $1 AND pipeline_state = $2
        GROUP BY city
        ORDER BY city
        "#,
    )
    .bind(executive_id)
    .bind(state)
    .fetch_all(pool)
    .await
}
