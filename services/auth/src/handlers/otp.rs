use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{RequestOtpInput, RequestOtpUseCase};

#[derive(Deserialize)]
pub struct RequestOtpRequest {
    pub phone_number: String,
}

pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestOtpRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = RequestOtpUseCase {
        challenges: state.challenge_repo(),
    };
    usecase
        .execute(RequestOtpInput {
            phone_number: body.phone_number,
        })
        .await?;
    Ok(StatusCode::CREATED)
}
