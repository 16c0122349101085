/// Bearer token authentication for Axum
///
/// Extracts the token from the `Authorization` header, validates it and puts
/// an [`AuthContext`] into the request extensions. Every rejection is a
/// `403 Forbidden`, missing and invalid tokens alike.
///
/// The `Bearer ` prefix is optional: `Authorization: <token>` is accepted as
/// well as `Authorization: Bearer <token>`.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Router, routing::get, middleware};
/// use leadtrack_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, executive {}!", auth.executive_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn(|req, next| {
///         jwt_auth_middleware("secret".to_string(), req, next)
///     }));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{validate_token, Claims, JwtError};
use crate::models::executive::ExecutiveRole;

/// Authenticated identity attached to each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Executive the token was issued to
    pub executive_id: i64,

    /// Role carried by the token
    pub role: ExecutiveRole,
}

impl AuthContext {
    pub fn new(executive_id: i64, role: ExecutiveRole) -> Self {
        Self { executive_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ExecutiveRole::Admin
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one
    #[error("No token provided")]
    MissingToken,

    /// Token failed validation
    #[error("Invalid token")]
    InvalidToken(#[source] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::InvalidToken(ref source) = self {
            tracing::debug!(error = %source, "Rejected bearer token");
        }

        let body = Json(json!({
            "error": "forbidden",
            "message": self.to_string(),
        }));

        (StatusCode::FORBIDDEN, body).into_response()
    }
}

/// Returns the raw token from the `Authorization` header
///
/// Strips an optional `Bearer ` prefix. Returns `None` when the header is
/// absent, not valid ASCII, or blank.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Validates the request's token and returns the caller's identity
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingToken)?;
    let claims = validate_token(token, secret).map_err(AuthError::InvalidToken)?;

    Ok(AuthContext::from(claims))
}

/// JWT authentication middleware
///
/// On success the request continues with an [`AuthContext`] extension.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authenticate(req.headers(), &secret)?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
