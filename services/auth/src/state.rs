use sea_orm::DatabaseConnection;

use crate::infra::db::{DbChallengeRepository, DbUserRepository};
use crate::usecase::token::TokenConfig;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenConfig,
    pub cookie_domain: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn challenge_repo(&self) -> DbChallengeRepository {
        DbChallengeRepository {
            db: self.db.clone(),
        }
    }
}
