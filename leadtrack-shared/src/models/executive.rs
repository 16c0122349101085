/// Executive model and database operations
///
/// Executives are the sales agents who own leads. They are created through
/// registration and never mutated afterwards; the admin role is granted out of
/// band (directly in the database).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE executives (
///     executive_id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role executive_role NOT NULL DEFAULT 'standard',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use leadtrack_shared::models::executive::{CreateExecutive, Executive, ExecutiveRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let executive = Executive::create(&pool, CreateExecutive {
///     name: "Rosa".to_string(),
///     email: "rosa@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: ExecutiveRole::Standard,
/// }).await?;
///
/// let found = Executive::find_by_email(&pool, "rosa@example.com").await?;
/// assert_eq!(found.map(|e| e.executive_id), Some(executive.executive_id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Executive role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "executive_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExecutiveRole {
    /// Works their own leads
    Standard,

    /// Cross-executive access
    Admin,
}

impl Default for ExecutiveRole {
    fn default() -> Self {
        ExecutiveRole::Standard
    }
}

/// Executive account
///
/// `password_hash` is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Executive {
    pub executive_id: i64,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: ExecutiveRole,
    pub created_at: DateTime<Utc>,
}

/// Directory view of an executive (admin listing)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExecutiveSummary {
    pub executive_id: i64,
    pub name: String,
    pub email: String,
    pub role: ExecutiveRole,
}

/// Name lookup result, visible to every authenticated executive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExecutiveName {
    pub executive_id: i64,
    pub name: String,
}

/// Input for creating an executive
#[derive(Debug, Clone)]
pub struct CreateExecutive {
    pub name: String,
    pub email: String,

    /// Argon2id hash, never the plaintext password
    pub password_hash: String,

    pub role: ExecutiveRole,
}

impl Executive {
    /// Inserts a new executive
    ///
    /// # Errors
    ///
    /// Fails with a unique violation when the email is already registered.
    pub async fn create(pool: &PgPool, data: CreateExecutive) -> Result<Self, sqlx::Error> {
        let executive = sqlx::query_as::<_, Executive>(
            r#"
            INSERT INTO executives (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING executive_id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        tracing::info!(executive_id = executive.executive_id, "Executive registered");
        Ok(executive)
    }

    /// Finds an executive by email, for login
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Executive>(
            r#"
            SELECT executive_id, name, email, password_hash, role, created_at
            FROM executives
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Looks up an executive's display name
    ///
    /// Email and role stay out of the result; those are for the admin listing.
    pub async fn find_name(
        pool: &PgPool,
        executive_id: i64,
    ) -> Result<Option<ExecutiveName>, sqlx::Error> {
        sqlx::query_as::<_, ExecutiveName>(
            r#"
            SELECT executive_id, name
            FROM executives
            WHERE executive_id = $1
            "#,
        )
        .bind(executive_id)
        .fetch_optional(pool)
        .await
    }

    /// Checks that an executive exists
    ///
    /// Accepts any executor so it can run inside a transaction.
    pub async fn exists<'e, E>(executor: E, executive_id: i64) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM executives WHERE executive_id = $1)",
        )
        .bind(executive_id)
        .fetch_one(executor)
        .await
    }

    /// Lists every executive, ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<ExecutiveSummary>, sqlx::Error> {
        sqlx::query_as::<_, ExecutiveSummary>(
            r#"
            SELECT executive_id, name, email, role
            FROM executives
            ORDER BY name, executive_id
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
