use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::ChallengeRepository;
use crate::domain::types::{OTP_TTL_SECS, OtpChallenge, OutboxEvent};
use crate::error::AuthServiceError;

/// Generate a 6-digit code, uniformly random over 100000–999999.
fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..=999_999).to_string()
}

pub struct RequestOtpInput {
    /// Canonical (E.164) phone number; normalization happens at the boundary.
    pub phone_number: String,
}

/// Issue a fresh OTP challenge for a phone number.
///
/// Supersedes every live challenge for the number and inserts the new one
/// atomically, so at most one challenge is live at any instant. The code is
/// dispatched by writing an `otp_requested` outbox event in the same
/// transaction; SMS delivery happens out-of-band and cannot roll back
/// challenge creation. The code is never returned to the caller.
pub struct RequestOtpUseCase<C>
where
    C: ChallengeRepository,
{
    pub challenges: C,
}

impl<C> RequestOtpUseCase<C>
where
    C: ChallengeRepository,
{
    pub async fn execute(&self, input: RequestOtpInput) -> Result<(), AuthServiceError> {
        let code = generate_code();
        let now = Utc::now();
        let challenge = OtpChallenge {
            id: Uuid::new_v4(),
            phone_number: input.phone_number.clone(),
            code: code.clone(),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            used_at: None,
            attempts: 0,
            created_at: now,
        };

        let event = OutboxEvent {
            id: Uuid::new_v4(),
            kind: "otp_requested".to_owned(),
            payload: json!({ "phone_number": input.phone_number, "code": code }),
            idempotency_key: format!("otp_requested:{}", challenge.id),
        };

        self.challenges
            .create_replacing_live(&challenge, &event)
            .await?;
        Ok(())
    }
}
