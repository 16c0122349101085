/// Comments on leads and latest-comment resolution
///
/// Comments are ordered by `created_at` descending with `comment_id`
/// descending as the tie-break, so "latest" is the comment with the greatest
/// `(created_at, comment_id)` pair. A lead without comments resolves to
/// [`NO_COMMENTS`].
///
/// All operations that take an `executive_id` are scoped through ownership of
/// the lead: touching a comment on someone else's lead is reported as
/// not found.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

use super::lead::LeadError;

/// Placeholder shown for leads that have no comments
pub const NO_COMMENTS: &str = "Sin Comentarios";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: i64,
    pub client_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    fn recency(&self) -> (DateTime<Utc>, i64) {
        (self.created_at, self.comment_id)
    }

    /// Text of the latest comment on a lead, or [`NO_COMMENTS`]
    pub async fn latest_for(pool: &PgPool, client_id: i64) -> Result<String, sqlx::Error> {
        let text = sqlx::query_scalar::<_, String>(
            r#"
            SELECT text
            FROM comments
            WHERE client_id = $1
            ORDER BY created_at DESC, comment_id DESC
            LIMIT 1
            "#,
        )
        .bind(client_id)
        .fetch_optional(pool)
        .await?;

        Ok(text.unwrap_or_else(|| NO_COMMENTS.to_string()))
    }

    /// Reduces comments to the latest one per lead in a single pass
    pub fn latest_by_lead<I>(comments: I) -> HashMap<i64, Comment>
    where
        I: IntoIterator<Item = Comment>,
    {
        let mut latest: HashMap<i64, Comment> = HashMap::new();

        for comment in comments {
            match latest.get(&comment.client_id) {
                Some(current) if current.recency() >= comment.recency() => {}
                _ => {
                    latest.insert(comment.client_id, comment);
                }
            }
        }

        latest
    }

    /// Latest comment for each of `client_ids`
    ///
    /// Leads without comments are absent from the map; callers substitute
    /// [`NO_COMMENTS`].
    pub async fn latest_for_leads(
        pool: &PgPool,
        client_ids: &[i64],
    ) -> Result<HashMap<i64, Comment>, sqlx::Error> {
        if client_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, client_id, text, created_at
            FROM comments
            WHERE client_id = ANY($1)
            "#,
        )
        .bind(client_ids)
        .fetch_all(pool)
        .await?;

        Ok(Self::latest_by_lead(comments))
    }

    /// Comments on an owned lead, newest first
    pub async fn list_for_lead(
        pool: &PgPool,
        client_id: i64,
        executive_id: i64,
    ) -> Result<Vec<Self>, LeadError> {
        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM leads WHERE client_id = $1 AND executive_id = $2)",
        )
        .bind(client_id)
        .bind(executive_id)
        .fetch_one(pool)
        .await?;

        if !owned {
            return Err(LeadError::NotFound);
        }

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, client_id, text, created_at
            FROM comments
            WHERE client_id = $1
            ORDER BY created_at DESC, comment_id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Adds a comment to an owned lead
    pub async fn create(
        pool: &PgPool,
        client_id: i64,
        executive_id: i64,
        text: &str,
    ) -> Result<Self, LeadError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (client_id, text)
            SELECT client_id, $3
            FROM leads
            WHERE client_id = $1 AND executive_id = $2
            RETURNING comment_id, client_id, text, created_at
            "#,
        )
        .bind(client_id)
        .bind(executive_id)
        .bind(text)
        .fetch_optional(pool)
        .await?
        .ok_or(LeadError::NotFound)?;

        tracing::info!(
            comment_id = comment.comment_id,
            client_id,
            executive_id,
            "Comment added"
        );
        Ok(comment)
    }

    /// Deletes a comment on an owned lead
    pub async fn delete(pool: &PgPool, comment_id: i64, executive_id: i64) -> Result<(), LeadError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments c
            USING leads l
            WHERE c.comment_id = $1
              AND l.client_id = c.client_id
              AND l.executive_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(executive_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LeadError::NotFound);
        }

        tracing::info!(comment_id, executive_id, "Comment deleted");
        Ok(())
    }
}
