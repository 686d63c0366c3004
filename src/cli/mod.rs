use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::app::{router, AppState};
use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "jobly-api")]
#[command(about = "Jobly API - companies and jobs REST backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides JOBLY_API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Print a signed token for a user, for local testing")]
    Token {
        #[arg(help = "Username to put in the token")]
        username: String,
        #[arg(long, help = "Mark the token as admin")]
        admin: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    config.validate().map_err(anyhow::Error::msg).context("invalid configuration")?;

    match cli.command {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
        Commands::Token { username, admin } => {
            let keys = JwtKeys::from_config(&config.security)?;
            println!("{}", keys.create_token(&username, admin)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    tracing::info!("Starting Jobly API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.api.port));
    let state = AppState::new(pool, config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
