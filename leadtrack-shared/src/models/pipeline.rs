/// Pipeline classifier
///
/// A lead is always in exactly one [`PipelineState`]. The state is a column on
/// the lead row, so exclusivity holds by construction; the classifier only
/// has to decide which transitions are allowed and apply them atomically.
///
/// # Transitions
///
/// ```text
///            move                 remove
///   lead  ─────────▶ enrolled  ───────────▶ lead
///         ─────────▶ bulk_contacted
///         ─────────▶ declined
/// ```
///
/// Moving between two named states is rejected; the lead has to be removed
/// back to `lead` first. Every transition is a single conditional `UPDATE`.
///
/// # Example
///
/// ```no_run
/// use leadtrack_shared::models::pipeline::{self, PipelineState};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// pipeline::move_to(&pool, 10, PipelineState::Enrolled, 1).await?;
/// assert_eq!(pipeline::classify(&pool, 10, 1).await?, PipelineState::Enrolled);
///
/// pipeline::remove_from(&pool, 10, PipelineState::Enrolled, 1).await?;
/// assert_eq!(pipeline::classify(&pool, 10, 1).await?, PipelineState::Lead);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use super::lead::{LeadError, LeadSummary};
use super::lead_filter::LeadFilter;

/// Where a lead sits in the sales pipeline
///
/// JSON uses the snake_case names; the legacy labels (`Leads`, `Inscritos`,
/// `Masivos`, `NoQuiere`) and CamelCase names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pipeline_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Raw lead, not yet worked
    #[serde(alias = "Lead", alias = "Leads", alias = "leads")]
    Lead,

    /// Enrolled in a course
    #[serde(alias = "Enrolled", alias = "Inscritos", alias = "inscritos")]
    Enrolled,

    /// Contacted through a bulk campaign
    #[serde(alias = "BulkContacted", alias = "Masivos", alias = "masivos")]
    BulkContacted,

    /// Not interested
    #[serde(alias = "Declined", alias = "NoQuiere", alias = "noquiere")]
    Declined,
}

impl PipelineState {
    pub const ALL: [PipelineState; 4] = [
        PipelineState::Lead,
        PipelineState::Enrolled,
        PipelineState::BulkContacted,
        PipelineState::Declined,
    ];

    /// Name used in JSON and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Lead => "lead",
            PipelineState::Enrolled => "enrolled",
            PipelineState::BulkContacted => "bulk_contacted",
            PipelineState::Declined => "declined",
        }
    }

    /// Path segment naming the state's collection
    pub fn slug(&self) -> &'static str {
        match self {
            PipelineState::Lead => "leads",
            PipelineState::Enrolled => "enrolled",
            PipelineState::BulkContacted => "bulk-contacted",
            PipelineState::Declined => "declined",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.slug() == slug)
    }

    /// Whether a lead in `self` may be moved into `target`
    ///
    /// Only raw leads move, and only into one of the named states.
    pub fn can_transition(&self, target: PipelineState) -> bool {
        *self == PipelineState::Lead && target != PipelineState::Lead
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineState {
    type Err = String;

    /// Accepts the JSON name or the path slug
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .or_else(|| Self::from_slug(s))
            .ok_or_else(|| format!("Unknown pipeline state: {}", s))
    }
}

/// Returns the state a lead currently occupies
///
/// # Errors
///
/// `LeadError::NotFound` when the lead does not exist or belongs to another
/// executive.
pub async fn classify(
    pool: &PgPool,
    client_id: i64,
    executive_id: i64,
) -> Result<PipelineState, LeadError> {
    sqlx::query_scalar::<_, PipelineState>(
        r#"
        SELECT pipeline_state
        FROM leads
        WHERE client_id = $1 AND executive_id = $2
        "#,
    )
    .bind(client_id)
    .bind(executive_id)
    .fetch_optional(pool)
    .await?
    .ok_or(LeadError::NotFound)
}

/// Moves a raw lead into a named state
///
/// # Errors
///
/// - `LeadError::Validation` when `target` is `lead` (use [`remove_from`])
/// - `LeadError::NotFound` when the lead is missing or not owned
/// - `LeadError::AlreadyInState` when the lead is already in `target`
/// - `LeadError::InvalidTransition` when the lead is in another named state
pub async fn move_to(
    pool: &PgPool,
    client_id: i64,
    target: PipelineState,
    executive_id: i64,
) -> Result<(), LeadError> {
    if !PipelineState::Lead.can_transition(target) {
        return Err(LeadError::Validation(
            "Leads return to the lead state by removal, not by move".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE leads
        SET pipeline_state = $3
        WHERE client_id = $1 AND executive_id = $2 AND pipeline_state = 'lead'
        "#,
    )
    .bind(client_id)
    .bind(executive_id)
    .bind(target)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        tracing::info!(client_id, executive_id, state = %target, "Lead moved");
        return Ok(());
    }

    // Nothing updated: work out why.
    let current = classify(pool, client_id, executive_id).await?;
    if current == target {
        Err(LeadError::AlreadyInState(target))
    } else {
        Err(LeadError::InvalidTransition {
            from: current,
            to: target,
        })
    }
}

/// Returns a lead from `state` to the raw `lead` state
///
/// # Errors
///
/// `LeadError::NotFound` when the lead is not currently in `state` (including
/// a second removal), or is missing or not owned.
pub async fn remove_from(
    pool: &PgPool,
    client_id: i64,
    state: PipelineState,
    executive_id: i64,
) -> Result<(), LeadError> {
    if state == PipelineState::Lead {
        return Err(LeadError::Validation(
            "Only enrolled, bulk_contacted and declined leads can be removed".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE leads
        SET pipeline_state = 'lead'
        WHERE client_id = $1 AND executive_id = $2 AND pipeline_state = $3
        "#,
    )
    .bind(client_id)
    .bind(executive_id)
    .bind(state)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LeadError::NotFound);
    }

    tracing::info!(client_id, executive_id, from = %state, "Lead returned to pipeline start");
    Ok(())
}

/// Lists the executive's leads in one state
///
/// Same rows as filtering on `status` alone.
pub async fn list_by_state(
    pool: &PgPool,
    state: PipelineState,
    executive_id: i64,
) -> Result<Vec<LeadSummary>, sqlx::Error> {
    LeadFilter {
        status: Some(state),
        ..Default::default()
    }
    .execute(pool, executive_id)
    .await
}
