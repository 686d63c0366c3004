#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use jobly_api::config::AppConfig;
use jobly_api::database::DatabaseManager;
use jobly_api::{router, AppState};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub const SECRET: &str = "test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, username: &str, is_admin: bool) -> String {
        self.state.jwt.create_token(username, is_admin).expect("token")
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::test();
    config.security.jwt_secret = SECRET.to_string();
    config.database.connection_timeout = 1;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    config
}

/// Serve the app on a free port against a pool that only connects on first
/// use, so routes rejected before any query need no database at all.
pub async fn spawn_app() -> Result<TestServer> {
    let config = test_config();
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    spawn_with_pool(pool, config).await
}

pub async fn spawn_with_pool(pool: PgPool, config: AppConfig) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(pool, config)?;
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    Ok(TestServer { port, base_url, state })
}

/// A pool on a fresh schema with migrations applied, or `None` (test skipped)
/// when `DATABASE_URL` is not set.
pub async fn test_pool() -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let schema = format!("test_{}", uuid::Uuid::new_v4().simple());
    let admin = PgPool::connect(&url).await?;
    sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema)).execute(&admin).await?;
    admin.close().await;

    let search_path = schema.clone();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                sqlx::query(&format!("SET search_path TO \"{}\"", search_path)).execute(conn).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await?;

    DatabaseManager::migrate(&pool).await?;
    Ok(Some(pool))
}

/// Companies c1..c3 (1..3 employees) and jobs j1 (c1, equity 0.1), j2 (c3,
/// equity 0.05) and j3 (c3, no equity).
pub async fn seed(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO companies (handle, name, num_employees, description, logo_url)
           VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                  ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
                  ('c3', 'C3', 3, 'Desc3', 'http://c3.img')"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"INSERT INTO jobs (title, salary, equity, company_handle)
           VALUES ('j1', 20000, 0.1, 'c1'),
                  ('j2', 500000, 0.05, 'c3'),
                  ('j3', 205000, 0, 'c3')"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
