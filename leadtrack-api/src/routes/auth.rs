/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new executive
/// - `POST /api/auth/login` - Exchange credentials for a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use leadtrack_shared::{
    auth::{jwt, password},
    models::executive::{CreateExecutive, Executive, ExecutiveRole},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub executive_id: i64,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,

    /// Bearer token for the `Authorization` header
    pub token: String,

    pub executive_id: i64,
    pub name: String,
    pub role: ExecutiveRole,
}

/// Registers a new executive
///
/// New executives always get the standard role.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Rosa Quispe",
///   "email": "rosa@example.com",
///   "password": "s3cret-pass"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let executive = Executive::create(
        &state.db,
        CreateExecutive {
            name: req.name,
            email: req.email,
            password_hash,
            role: ExecutiveRole::Standard,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Executive registered successfully".to_string(),
            executive_id: executive.executive_id,
        }),
    ))
}

/// Logs an executive in
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "rosa@example.com",
///   "password": "s3cret-pass"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let executive = Executive::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &executive.password_hash)?;
    if !valid {
        tracing::info!(executive_id = executive.executive_id, "Failed login attempt");
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::with_expiration(
        executive.executive_id,
        executive.role,
        state.token_ttl(),
    );
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(executive_id = executive.executive_id, "Executive logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        executive_id: executive.executive_id,
        name: executive.name,
        role: executive.role,
    }))
}
