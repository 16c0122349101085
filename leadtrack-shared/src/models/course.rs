/// Course model
///
/// Leads express interest in a course. A course cannot be deleted while any
/// lead still references it; the foreign key has no cascade and the delete
/// surfaces as a database error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub course_id: i64,
    pub name: String,
    pub course_date: NaiveDate,
}

/// Input for creating a course; a missing date means today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    pub name: String,
    pub course_date: Option<NaiveDate>,
}

impl Course {
    pub async fn create(pool: &PgPool, data: CreateCourse) -> Result<Self, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (name, course_date)
            VALUES ($1, COALESCE($2, CURRENT_DATE))
            RETURNING course_id, name, course_date
            "#,
        )
        .bind(data.name)
        .bind(data.course_date)
        .fetch_one(pool)
        .await?;

        tracing::info!(course_id = course.course_id, "Course created");
        Ok(course)
    }

    /// All courses, most recent first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT course_id, name, course_date
            FROM courses
            ORDER BY course_date DESC, name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Replaces name and date; `None` when the course does not exist
    pub async fn update(
        pool: &PgPool,
        course_id: i64,
        name: &str,
        course_date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET name = $2, course_date = $3
            WHERE course_id = $1
            RETURNING course_id, name, course_date
            "#,
        )
        .bind(course_id)
        .bind(name)
        .bind(course_date)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a course, returning whether a row was removed
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation while leads reference the course.
    pub async fn delete(pool: &PgPool, course_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE course_id = $1")
            .bind(course_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
