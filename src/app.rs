use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtError, JwtKeys};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::models::{Company, Job, User};
use crate::database::Repository;
use crate::handlers::{auth, companies, health, jobs, users};
use crate::middleware::{authenticate_jwt, require_admin, require_self_or_admin};

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Result<Self, JwtError> {
        let jwt = JwtKeys::from_config(&config.security)?;
        Ok(Self { pool, jwt, config: Arc::new(config) })
    }

    pub fn companies(&self) -> Repository<Company> {
        Repository::new(self.pool.clone())
    }

    pub fn jobs(&self) -> Repository<Job> {
        Repository::new(self.pool.clone())
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.pool.clone())
    }
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
        .route("/companies", get(companies::list))
        .route("/companies/:handle", get(companies::get))
        .route("/jobs", get(jobs::list))
        .route("/jobs/:id", get(jobs::get));

    let admin = Router::new()
        .route("/companies", post(companies::create))
        .route("/companies/:handle", patch(companies::update).delete(companies::remove))
        .route("/jobs", post(jobs::create))
        .route("/jobs/:id", patch(jobs::update).delete(jobs::remove))
        .route("/users", get(users::list).post(users::create))
        .route_layer(from_fn(require_admin));

    let self_or_admin = Router::new()
        .route("/users/:username", get(users::get).patch(users::update).delete(users::remove))
        .route_layer(from_fn(require_self_or_admin));

    Router::new()
        .merge(public)
        .merge(admin)
        .merge(self_or_admin)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), authenticate_jwt))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
