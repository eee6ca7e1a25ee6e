use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use chatwire_auth::config::AuthConfig;
use chatwire_auth::domain::repository::ChallengeRepository as _;
use chatwire_auth::infra::db::DbChallengeRepository;
use chatwire_auth::router::build_router;
use chatwire_auth::state::AppState;
use chatwire_auth::usecase::token::TokenConfig;

/// How often expired challenges are purged from the store.
const CHALLENGE_SWEEP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() {
    chatwire_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db: db.clone(),
        tokens: TokenConfig {
            primary_secret: config.jwt_secret,
            refresh_secret: config.jwt_refresh_secret,
            access_expiry_secs: config.jwt_access_expiry_secs,
            refresh_expiry_secs: config.jwt_refresh_expiry_secs,
            web_expiry_secs: config.jwt_web_expiry_secs,
        },
        cookie_domain: config.cookie_domain,
    };

    // Expired challenges are dead weight; sweep them out-of-band so request
    // handling never pays for the purge.
    tokio::spawn(async move {
        let repo = DbChallengeRepository { db };
        let mut tick = tokio::time::interval(Duration::from_secs(CHALLENGE_SWEEP_INTERVAL_SECS));
        loop {
            tick.tick().await;
            match repo.delete_expired().await {
                Ok(0) => {}
                Ok(count) => tracing::debug!(count, "purged expired otp challenges"),
                Err(e) => tracing::warn!(error = %e, "expired challenge sweep failed"),
            }
        }
    });

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
