/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use leadtrack_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = leadtrack_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::Duration;
use leadtrack_shared::auth::authorization::AccessPolicy;
use leadtrack_shared::auth::middleware::{jwt_auth_middleware, AuthError};
use leadtrack_shared::models::pipeline::PipelineState;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Lifetime of issued tokens
    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.config.jwt.ttl_hours)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.config.access.policy()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/                       # Public
///     │   ├── POST /register
///     │   └── POST /login
///     │                                # Everything below requires a token
///     ├── /leads/
///     │   ├── GET|POST /
///     │   ├── POST     /bulk
///     │   ├── GET|PUT|DELETE /:id
///     │   ├── GET      /:id/state
///     │   └── PUT      /:id/change-executive
///     ├── /enrolled/ /bulk-contacted/ /declined/
///     │   ├── GET|POST /               # list, move a lead in
///     │   ├── POST     /new            # create directly in the state
///     │   └── DELETE   /:client_id     # back to lead
///     ├── /cities/  GET / and GET /:state
///     ├── /stats/   by-course, by-city-bulk, by-city-declined (/:executive_id)
///     ├── /courses/ GET|POST /, PUT|DELETE /:id
///     ├── /comments/ GET /:lead_id, POST /, DELETE /:id
///     ├── /executives/:id              # name lookup
///     ├── /admin/executives            # admin only
///     └── POST /filter
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. Response compression (gzip, brotli)
/// 3. CORS (tower-http CorsLayer)
/// 4. JWT authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let lead_routes = Router::new()
        .route(
            "/",
            get(routes::leads::list_leads).post(routes::leads::create_lead),
        )
        .route("/bulk", post(routes::leads::create_bulk))
        .route(
            "/:id",
            get(routes::leads::get_lead)
                .put(routes::leads::update_lead)
                .delete(routes::leads::delete_lead),
        )
        .route("/:id/state", get(routes::leads::lead_state))
        .route(
            "/:id/change-executive",
            put(routes::leads::change_executive),
        );

    let city_routes = Router::new()
        .route("/", get(routes::cities::list_cities))
        .route("/:state", get(routes::cities::list_cities_in_state));

    let stats_routes = Router::new()
        .route("/by-course/:executive_id", get(routes::stats::by_course))
        .route("/by-city-bulk/:executive_id", get(routes::stats::by_city_bulk))
        .route(
            "/by-city-declined/:executive_id",
            get(routes::stats::by_city_declined),
        );

    let course_routes = Router::new()
        .route(
            "/",
            get(routes::courses::list_courses).post(routes::courses::create_course),
        )
        .route(
            "/:id",
            put(routes::courses::update_course).delete(routes::courses::delete_course),
        );

    let comment_routes = Router::new()
        .route("/", post(routes::comments::create_comment))
        .route(
            "/:id",
            get(routes::comments::list_comments).delete(routes::comments::delete_comment),
        );

    // Everything here requires a valid token
    let protected_routes = Router::new()
        .nest("/leads", lead_routes)
        .nest("/enrolled", pipeline_routes(PipelineState::Enrolled))
        .nest("/bulk-contacted", pipeline_routes(PipelineState::BulkContacted))
        .nest("/declined", pipeline_routes(PipelineState::Declined))
        .nest("/cities", city_routes)
        .nest("/stats", stats_routes)
        .nest("/courses", course_routes)
        .nest("/comments", comment_routes)
        .route("/executives/:id", get(routes::executives::get_executive))
        .route(
            "/admin/executives",
            get(routes::executives::list_executives),
        )
        .route("/filter", post(routes::filter::filter_leads))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Routes shared by the three named pipeline states
///
/// The state is handed to the handlers as a request extension.
fn pipeline_routes(pipeline_state: PipelineState) -> Router<AppState> {
    use crate::routes::pipeline;

    Router::new()
        .route("/", get(pipeline::list).post(pipeline::move_lead))
        .route("/new", post(pipeline::create_in_state))
        .route("/:client_id", axum::routing::delete(pipeline::remove))
        .layer(Extension(pipeline_state))
}

/// JWT authentication middleware layer
///
/// Rejects requests without a valid token with `403 Forbidden`, otherwise
/// injects `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next).await
}
