/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `leads`: Lead CRUD, bulk load, reassignment, state lookup
/// - `pipeline`: Enrolled / bulk-contacted / declined collections
/// - `cities`: Distinct cities of an executive's leads
/// - `stats`: Per-executive counts by course and city
/// - `courses`: Course management
/// - `comments`: Comments on leads
/// - `executives`: Executive lookup and admin listing
/// - `filter`: Multi-criterion lead filter

pub mod auth;
pub mod cities;
pub mod comments;
pub mod courses;
pub mod executives;
pub mod filter;
pub mod health;
pub mod leads;
pub mod pipeline;
pub mod stats;

use serde::{Deserialize, Serialize};

/// Optional `?executive_id=` override accepted by executive-scoped endpoints
///
/// `ejecutivoId` is accepted as an alias for older clients.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExecutiveQuery {
    #[serde(alias = "ejecutivoId")]
    pub executive_id: Option<i64>,
}

/// Body of responses that only confirm an action
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
