use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account keyed by phone number.
///
/// Created lazily on first successful OTP verification; `is_verified` is set
/// then and never reverts. `is_active` gates every future authentication.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub phone_number: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One-time-passcode challenge for a phone number.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub phone_number: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Live = not yet consumed or superseded, and not expired.
    pub fn is_live(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Client device class; decides the token-issuance policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Web,
    Mobile,
}

/// Lightweight user view returned alongside freshly issued tokens.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub phone_number: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            phone_number: user.phone_number.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Verified identity reconstructed from a bearer credential.
/// Read fresh from the store on every call — never cached — so deactivation
/// takes effect on the very next request.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub phone_number: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_verified: bool,
}

/// Outbox event for async delivery (e.g. the OTP SMS).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// OTP challenge time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Maximum failed code comparisons before a challenge is permanently dead.
pub const MAX_OTP_ATTEMPTS: i32 = 3;
