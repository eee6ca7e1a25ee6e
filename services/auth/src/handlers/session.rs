use axum::{Json, extract::State, response::IntoResponse};

use chatwire_auth_types::credential::Credential;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::session::ResolvePrincipalUseCase;

// ── GET /auth/me ──────────────────────────────────────────────────────────────

pub async fn me(
    State(state): State<AppState>,
    credential: Credential,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = ResolvePrincipalUseCase {
        users: state.user_repo(),
        primary_secret: state.tokens.primary_secret.clone(),
    };
    let principal = usecase.execute(&credential.0).await?;
    Ok(Json(principal))
}
