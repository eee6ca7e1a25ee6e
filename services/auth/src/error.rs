use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// `ChallengeNotFound`, `AttemptsExceeded` and `InvalidCode` are distinct
/// internally but all map to 401 so a caller cannot probe which phone
/// numbers have live challenges beyond what `ChallengeNotFound` reveals.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid or expired otp")]
    ChallengeNotFound,
    #[error("maximum otp attempts exceeded")]
    AttemptsExceeded,
    #[error("invalid otp")]
    InvalidCode,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::AttemptsExceeded => "ATTEMPTS_EXCEEDED",
            Self::InvalidCode => "INVALID_CODE",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ChallengeNotFound
            | Self::AttemptsExceeded
            | Self::InvalidCode
            | Self::InvalidRefreshToken
            | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
