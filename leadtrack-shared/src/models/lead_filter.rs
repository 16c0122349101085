/// Composable lead filter
///
/// A [`LeadFilter`] turns optional criteria into a list of [`FilterClause`]s,
/// which are rendered into one `SELECT` with every value bound as a
/// parameter. Clauses are combined with `AND`; an omitted criterion adds no
/// clause. The executive scope is always the first clause.
///
/// Listings elsewhere (`Lead::list_by_executive`, `pipeline::list_by_state`)
/// are filters with no criteria, or with only `status`, so they return the
/// same rows in the same order.
///
/// # Example
///
/// ```
/// use leadtrack_shared::models::lead_filter::LeadFilter;
/// use leadtrack_shared::models::pipeline::PipelineState;
///
/// let filter = LeadFilter {
///     city: Some("Lima".to_string()),
///     status: Some(PipelineState::Enrolled),
///     ..Default::default()
/// };
///
/// let qb = filter.query(3);
/// assert!(qb.sql().contains("l.city = $2"));
/// assert!(qb.sql().contains("l.pipeline_state = $3"));
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::lead::{Lead, LeadSummary, LEAD_SELECT};
use super::pipeline::PipelineState;

/// Filter criteria; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFilter {
    /// Exact city match; an empty string is treated as omitted
    pub city: Option<String>,

    pub course_id: Option<i64>,

    /// Exact interest level; `0` is a real constraint
    pub interest_level: Option<i32>,

    /// Inclusive lower bound on the creation date
    pub created_from: Option<NaiveDate>,

    /// Inclusive upper bound on the creation date
    pub created_to: Option<NaiveDate>,

    /// Pipeline state
    pub status: Option<PipelineState>,
}

/// One `AND`-ed condition of a filter query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    Executive(i64),
    City(String),
    Course(i64),
    Interest(i32),
    CreatedFrom(NaiveDate),
    CreatedTo(NaiveDate),
    State(PipelineState),
}

impl FilterClause {
    /// Appends `<column> <op> $n` to the query
    fn push(self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            FilterClause::Executive(id) => qb.push("l.executive_id = ").push_bind(id),
            FilterClause::City(city) => qb.push("l.city = ").push_bind(city),
            FilterClause::Course(id) => qb.push("l.course_id = ").push_bind(id),
            FilterClause::Interest(level) => qb.push("l.interest_level = ").push_bind(level),
            FilterClause::CreatedFrom(date) => qb.push("l.created_at::date >= ").push_bind(date),
            FilterClause::CreatedTo(date) => qb.push("l.created_at::date <= ").push_bind(date),
            FilterClause::State(state) => qb.push("l.pipeline_state = ").push_bind(state),
        };
    }
}

impl LeadFilter {
    /// Clauses for this filter scoped to `executive_id`, in a fixed order
    pub fn clauses(&self, executive_id: i64) -> Vec<FilterClause> {
        let mut clauses = vec![FilterClause::Executive(executive_id)];

        if let Some(city) = self.city.as_deref().filter(|city| !city.is_empty()) {
            clauses.push(FilterClause::City(city.to_string()));
        }
        if let Some(course_id) = self.course_id {
            clauses.push(FilterClause::Course(course_id));
        }
        if let Some(level) = self.interest_level {
            clauses.push(FilterClause::Interest(level));
        }
        if let Some(from) = self.created_from {
            clauses.push(FilterClause::CreatedFrom(from));
        }
        if let Some(to) = self.created_to {
            clauses.push(FilterClause::CreatedTo(to));
        }
        if let Some(state) = self.status {
            clauses.push(FilterClause::State(state));
        }

        clauses
    }

    /// Builds the filter query without running it
    pub fn query(&self, executive_id: i64) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(LEAD_SELECT);
        qb.push(" WHERE ");

        for (i, clause) in self.clauses(executive_id).into_iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            clause.push(&mut qb);
        }

        qb.push(" ORDER BY l.created_at DESC, l.client_id DESC");
        qb
    }

    /// Runs the filter and resolves each lead's latest comment
    pub async fn execute(
        &self,
        pool: &PgPool,
        executive_id: i64,
    ) -> Result<Vec<LeadSummary>, sqlx::Error> {
        let mut qb = self.query(executive_id);
        let leads = qb.build_query_as::<Lead>().fetch_all(pool).await?;

        tracing::debug!(
            executive_id,
            filter = ?self,
            matched = leads.len(),
            "Lead filter executed"
        );

        LeadSummary::resolve(pool, leads).await
    }
}
