use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use chatwire_auth_types::{
    cookie::{clear_access_token_cookie, set_access_token_cookie},
    credential::Credential,
};

use crate::domain::types::DeviceClass;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::session::ResolvePrincipalUseCase;
use crate::usecase::token::{
    IssuedTokens, RefreshTokenUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

const X_CHATWIRE_ACCESS_TOKEN_EXPIRES: &str = "x-chatwire-access-token-expires";

fn token_expires_header(exp: u64) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(X_CHATWIRE_ACCESS_TOKEN_EXPIRES),
        HeaderValue::from_str(&exp.to_string()).unwrap(),
    )
}

// ── POST /auth/token ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub code: String,
    pub device_type: DeviceClass,
}

pub async fn create_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Response, AuthServiceError> {
    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        challenges: state.challenge_repo(),
        tokens: state.tokens.clone(),
    };

    let out = usecase
        .execute(VerifyOtpInput {
            phone_number: body.phone_number,
            code: body.code,
            device: body.device_type,
        })
        .await?;

    match out.tokens {
        // Web: the token travels only in the HTTP-only cookie, never in the
        // response body.
        IssuedTokens::Web { token, token_exp } => {
            let jar = set_access_token_cookie(
                jar,
                token,
                state.cookie_domain.clone(),
                state.tokens.web_expiry_secs,
            );
            let mut headers = HeaderMap::new();
            let (name, value) = token_expires_header(token_exp);
            headers.insert(name, value);
            Ok((
                StatusCode::CREATED,
                jar,
                headers,
                Json(json!({ "user": out.user })),
            )
                .into_response())
        }
        IssuedTokens::Mobile {
            access_token,
            access_token_exp,
            refresh_token,
        } => Ok((
            StatusCode::CREATED,
            Json(json!({
                "user": out.user,
                "access_token": access_token,
                "access_token_exp": access_token_exp,
                "refresh_token": refresh_token,
            })),
        )
            .into_response()),
    }
}

// ── PATCH /auth/token ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub access_token_exp: u64,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RefreshTokenUseCase {
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    };

    let out = usecase.execute(&body.refresh_token).await?;

    Ok((
        StatusCode::OK,
        Json(RefreshTokenResponse {
            access_token: out.access_token,
            access_token_exp: out.access_token_exp,
        }),
    ))
}

// ── DELETE /auth/token ────────────────────────────────────────────────────────

pub async fn revoke_token(
    State(state): State<AppState>,
    credential: Credential,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    // Only an authenticated caller may log out; rejects stale credentials.
    let usecase = ResolvePrincipalUseCase {
        users: state.user_repo(),
        primary_secret: state.tokens.primary_secret.clone(),
    };
    usecase.execute(&credential.0).await?;

    let jar = clear_access_token_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
