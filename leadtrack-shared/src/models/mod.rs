/// Database models for LeadTrack
///
/// # Models
///
/// - `executive`: Sales executives and their roles
/// - `course`: Courses leads are interested in
/// - `lead`: Lead repository (CRUD, bulk load, reassignment)
/// - `comment`: Comments on leads and latest-comment resolution
/// - `pipeline`: Pipeline states and transitions
/// - `lead_filter`: Composable multi-criterion lead filter
/// - `stats`: Per-executive counts by course and city
///
/// # Example
///
/// ```no_run
/// use leadtrack_shared::models::lead::{CreateLead, Lead};
/// use leadtrack_shared::models::pipeline::{self, PipelineState};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let client_id = Lead::create(&pool, 1, CreateLead {
///     name: Some("Ana".to_string()),
///     ..Default::default()
/// }).await?;
///
/// pipeline::move_to(&pool, client_id, PipelineState::Enrolled, 1).await?;
/// let enrolled = pipeline::list_by_state(&pool, PipelineState::Enrolled, 1).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod course;
pub mod executive;
pub mod lead;
pub mod lead_filter;
pub mod pipeline;
pub mod stats;
