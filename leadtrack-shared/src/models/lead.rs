/// Lead repository
///
/// Leads belong to exactly one executive. Every read and write here is scoped
/// by the owning executive: a lead owned by someone else behaves exactly like
/// a lead that does not exist. The one exception is [`Lead::reassign`], whose
/// scope is optional so administrators can move leads between executives.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE leads (
///     client_id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL DEFAULT '',
///     city VARCHAR(255) NOT NULL DEFAULT '',
///     phone VARCHAR(64) NOT NULL DEFAULT '',
///     interest_level INTEGER NOT NULL DEFAULT 0,
///     course_id BIGINT REFERENCES courses(course_id),
///     executive_id BIGINT NOT NULL REFERENCES executives(executive_id),
///     pipeline_state pipeline_state NOT NULL DEFAULT 'lead',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use leadtrack_shared::models::lead::{CreateLead, Lead};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let client_id = Lead::create(&pool, 1, CreateLead {
///     name: Some("Ana".to_string()),
///     city: Some("Lima".to_string()),
///     interest_level: Some(5),
///     course_id: Some(7),
///     ..Default::default()
/// }).await?;
///
/// let lead = Lead::get(&pool, client_id, 1).await?;
/// assert_eq!(lead.city, "Lima");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use super::comment::{Comment, NO_COMMENTS};
use super::executive::Executive;
use super::lead_filter::LeadFilter;
use super::pipeline::PipelineState;

/// Rows per multi-row INSERT in [`Lead::create_bulk`]
///
/// Six bound parameters per row keeps a chunk well under the Postgres limit
/// of 65535 parameters per statement.
const BULK_CHUNK_SIZE: usize = 1000;

/// Lead columns joined with the course name and date
///
/// Bulk-loaded leads may have no course, hence the outer join.
pub(crate) const LEAD_SELECT: &str = r#"
    SELECT l.client_id, l.name, l.city, l.phone, l.interest_level, l.course_id,
           c.name AS course_name, c.course_date,
           l.executive_id, l.pipeline_state, l.created_at
    FROM leads l
    LEFT JOIN courses c ON c.course_id = l.course_id
"#;

/// Errors from lead, pipeline and comment operations
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    /// Lead does not exist or is owned by another executive
    #[error("Lead not found")]
    NotFound,

    /// Reassignment target does not exist
    #[error("Executive {0} does not exist")]
    InvalidExecutive(i64),

    /// Move into the state the lead already occupies
    #[error("Lead is already in state {0}")]
    AlreadyInState(PipelineState),

    /// Move between two named states
    #[error("Cannot move lead from {from} to {to}; remove it from {from} first")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },

    /// Input rejected before touching the database
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A lead with its course name and date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub client_id: i64,
    pub name: String,
    pub city: String,
    pub phone: String,
    pub interest_level: i32,
    pub course_id: Option<i64>,
    pub course_name: Option<String>,
    pub course_date: Option<NaiveDate>,
    pub executive_id: i64,
    pub pipeline_state: PipelineState,
    pub created_at: DateTime<Utc>,
}

/// Listing row: a lead plus its latest comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSummary {
    #[serde(flatten)]
    pub lead: Lead,

    /// Latest comment text, or "Sin Comentarios"
    pub latest_comment: String,

    /// When the latest comment was written; `None` without comments
    pub latest_comment_at: Option<DateTime<Utc>>,
}

impl LeadSummary {
    /// Pairs each lead with its entry in `latest`, falling back to the
    /// no-comments placeholder
    pub fn attach(leads: Vec<Lead>, latest: &HashMap<i64, Comment>) -> Vec<Self> {
        leads
            .into_iter()
            .map(|lead| match latest.get(&lead.client_id) {
                Some(comment) => LeadSummary {
                    lead,
                    latest_comment: comment.text.clone(),
                    latest_comment_at: Some(comment.created_at),
                },
                None => LeadSummary {
                    lead,
                    latest_comment: NO_COMMENTS.to_string(),
                    latest_comment_at: None,
                },
            })
            .collect()
    }

    /// Resolves latest comments for `leads` with one extra query
    pub async fn resolve(pool: &PgPool, leads: Vec<Lead>) -> Result<Vec<Self>, sqlx::Error> {
        let ids: Vec<i64> = leads.iter().map(|lead| lead.client_id).collect();
        let latest = Comment::latest_for_leads(pool, &ids).await?;

        Ok(Self::attach(leads, &latest))
    }
}

/// Lead fields as supplied by clients
///
/// Every field is optional on input; see [`NewLead`] for the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateLead {
    pub name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub interest_level: Option<i32>,
    pub course_id: Option<i64>,
}

/// Lead fields with defaults applied: empty text, interest 0, no course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub city: String,
    pub phone: String,
    pub interest_level: i32,
    pub course_id: Option<i64>,
}

impl From<CreateLead> for NewLead {
    fn from(data: CreateLead) -> Self {
        Self {
            name: data.name.unwrap_or_default(),
            city: data.city.unwrap_or_default(),
            phone: data.phone.unwrap_or_default(),
            interest_level: data.interest_level.unwrap_or(0),
            course_id: data.course_id,
        }
    }
}

/// Partial update; `None` keeps the stored value
///
/// A missing or `null` `course_id` keeps the current course, so an update
/// cannot detach a lead from its course.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLead {
    pub name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub interest_level: Option<i32>,
    pub course_id: Option<i64>,
}

fn require_name(name: &str) -> Result<(), LeadError> {
    if name.trim().is_empty() {
        return Err(LeadError::Validation("Lead name is required".to_string()));
    }
    Ok(())
}

impl Lead {
    /// Creates a raw lead owned by `executive_id`, returning its id
    ///
    /// # Errors
    ///
    /// `LeadError::Validation` when the name is missing or blank.
    pub async fn create(
        pool: &PgPool,
        executive_id: i64,
        data: CreateLead,
    ) -> Result<i64, LeadError> {
        Self::create_in_state(pool, executive_id, data, PipelineState::Lead).await
    }

    /// Creates a lead directly in `state`
    pub async fn create_in_state(
        pool: &PgPool,
        executive_id: i64,
        data: CreateLead,
        state: PipelineState,
    ) -> Result<i64, LeadError> {
        let lead = NewLead::from(data);
        require_name(&lead.name)?;

        let client_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO leads (name, city, phone, interest_level, course_id, executive_id, pipeline_state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING client_id
            "#,
        )
        .bind(lead.name)
        .bind(lead.city)
        .bind(lead.phone)
        .bind(lead.interest_level)
        .bind(lead.course_id)
        .bind(executive_id)
        .bind(state)
        .fetch_one(pool)
        .await?;

        tracing::info!(client_id, executive_id, state = %state, "Lead created");
        Ok(client_id)
    }

    /// Inserts many leads in one transaction, returning how many were stored
    ///
    /// Missing fields take the [`NewLead`] defaults; names are not required
    /// here. Either every row is stored or none is.
    ///
    /// # Errors
    ///
    /// `LeadError::Validation` for an empty batch.
    pub async fn create_bulk(
        pool: &PgPool,
        executive_id: i64,
        leads: Vec<CreateLead>,
    ) -> Result<u64, LeadError> {
        if leads.is_empty() {
            return Err(LeadError::Validation(
                "At least one lead is required".to_string(),
            ));
        }

        let rows: Vec<NewLead> = leads.into_iter().map(NewLead::from).collect();
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for chunk in rows.chunks(BULK_CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO leads (name, city, phone, interest_level, course_id, executive_id) ",
            );
            qb.push_values(chunk, |mut row, lead| {
                row.push_bind(lead.name.clone())
                    .push_bind(lead.city.clone())
                    .push_bind(lead.phone.clone())
                    .push_bind(lead.interest_level)
                    .push_bind(lead.course_id)
                    .push_bind(executive_id);
            });

            inserted += qb.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        tracing::info!(executive_id, count = inserted, "Bulk leads created");
        Ok(inserted)
    }

    /// Fetches one owned lead
    pub async fn get(pool: &PgPool, client_id: i64, executive_id: i64) -> Result<Self, LeadError> {
        let sql = format!("{LEAD_SELECT} WHERE l.client_id = $1 AND l.executive_id = $2");

        sqlx::query_as::<_, Lead>(&sql)
            .bind(client_id)
            .bind(executive_id)
            .fetch_optional(pool)
            .await?
            .ok_or(LeadError::NotFound)
    }

    /// Every lead of the executive, in any state, newest first
    pub async fn list_by_executive(
        pool: &PgPool,
        executive_id: i64,
    ) -> Result<Vec<LeadSummary>, sqlx::Error> {
        LeadFilter::default().execute(pool, executive_id).await
    }

    /// Applies a partial update and returns the stored lead
    pub async fn update(
        pool: &PgPool,
        client_id: i64,
        executive_id: i64,
        data: UpdateLead,
    ) -> Result<Self, LeadError> {
        if let Some(name) = &data.name {
            require_name(name)?;
        }

        let lead = sqlx::query_as::<_, Lead>(
            r#"
            WITH updated AS (
                UPDATE leads
                SET name = COALESCE($3, name),
                    city = COALESCE($4, city),
                    phone = COALESCE($5, phone),
                    interest_level = COALESCE($6, interest_level),
                    course_id = COALESCE($7, course_id)
                WHERE client_id = $1 AND executive_id = $2
                RETURNING *
            )
            SELECT u.client_id, u.name, u.city, u.phone, u.interest_level, u.course_id,
                   c.name AS course_name, c.course_date,
                   u.executive_id, u.pipeline_state, u.created_at
            FROM updated u
            LEFT JOIN courses c ON c.course_id = u.course_id
            "#,
        )
        .bind(client_id)
        .bind(executive_id)
        .bind(data.name)
        .bind(data.city)
        .bind(data.phone)
        .bind(data.interest_level)
        .bind(data.course_id)
        .fetch_optional(pool)
        .await?
        .ok_or(LeadError::NotFound)?;

        tracing::info!(client_id, executive_id, "Lead updated");
        Ok(lead)
    }

    /// Deletes an owned lead together with its comments
    ///
    /// Runs in one transaction; when the lead is not found nothing is
    /// deleted.
    pub async fn delete(pool: &PgPool, client_id: i64, executive_id: i64) -> Result<(), LeadError> {
        let mut tx = pool.begin().await?;

        let comments = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE client_id IN (
                SELECT client_id FROM leads WHERE client_id = $1 AND executive_id = $2
            )
            "#,
        )
        .bind(client_id)
        .bind(executive_id)
        .execute(&mut *tx)
        .await?;

        let leads = sqlx::query("DELETE FROM leads WHERE client_id = $1 AND executive_id = $2")
            .bind(client_id)
            .bind(executive_id)
            .execute(&mut *tx)
            .await?;

        if leads.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(LeadError::NotFound);
        }

        tx.commit().await?;

        tracing::info!(
            client_id,
            executive_id,
            comments_deleted = comments.rows_affected(),
            "Lead deleted"
        );
        Ok(())
    }

    /// Hands a lead over to another executive
    ///
    /// `scope` restricts the lead to one current owner; `None` is
    /// unrestricted (administrators).
    ///
    /// # Errors
    ///
    /// - `LeadError::InvalidExecutive` when the target does not exist; the
    ///   lead is left untouched
    /// - `LeadError::NotFound` when the lead is missing or outside `scope`
    pub async fn reassign(
        pool: &PgPool,
        client_id: i64,
        new_executive_id: i64,
        scope: Option<i64>,
    ) -> Result<(), LeadError> {
        let mut tx = pool.begin().await?;

        if !Executive::exists(&mut *tx, new_executive_id).await? {
            tx.rollback().await?;
            return Err(LeadError::InvalidExecutive(new_executive_id));
        }

        let result = sqlx::query(
            r#"
            UPDATE leads
            SET executive_id = $2
            WHERE client_id = $1 AND ($3::BIGINT IS NULL OR executive_id = $3)
            "#,
        )
        .bind(client_id)
        .bind(new_executive_id)
        .bind(scope)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(LeadError::NotFound);
        }

        tx.commit().await?;

        tracing::info!(client_id, new_executive_id, scope = ?scope, "Lead reassigned");
        Ok(())
    }

    /// Distinct non-empty cities among the executive's leads
    ///
    /// `state` narrows the search to one pipeline state.
    pub async fn distinct_cities(
        pool: &PgPool,
        executive_id: i64,
        state: Option<PipelineState>,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT city
            FROM leads
            WHERE executive_id = $1
              AND city <> ''
              AND ($2::pipeline_state IS NULL OR pipeline_state = $2)
            ORDER BY city
            "#,
        )
        .bind(executive_id)
        .bind(state)
        .fetch_all(pool)
        .await
    }
}
