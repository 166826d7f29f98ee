use anyhow::Result;
use sea_orm::{ConnectionTrait, Database};
use service::token::DEFAULT_RESET_TTL_SECS;
use service::{FeedService, IdentityService, PostService, SocialGraph, TokenSigner};

use crate::mailer::Mailer;
use crate::schemas::AppState;

/// Application configuration pulled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub secret_key: String,
    pub reset_token_ttl_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://chirp.db".to_string()),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            secret_key: std::env::var("SECRET_KEY")
                .unwrap_or_else(|_| "insecure-dev-secret".to_string()),
            reset_token_ttl_secs: std::env::var("RESET_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RESET_TTL_SECS),
        }
    }
}

/// Connect to the store and wire up the service components with an
/// explicit handle each; dependency injection happens here, once.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    // Cascade deletes depend on foreign keys being enforced
    if config.database_url.starts_with("sqlite") {
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }

    let signer = TokenSigner::new(config.secret_key.as_bytes(), config.reset_token_ttl_secs);
    let identity = IdentityService::new(db.clone(), signer)?;
    let graph = SocialGraph::new(db.clone());
    let feed = FeedService::new(db.clone());
    let posts = PostService::new(db.clone());
    let mailer = Mailer::spawn();

    Ok(AppState {
        db,
        identity,
        graph,
        feed,
        posts,
        mailer,
    })
}
