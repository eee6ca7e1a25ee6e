#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{OtpChallenge, OutboxEvent, User};
use crate::error::AuthServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    /// Insert a new user. The phone number is unique at the store level.
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Mark a successful login: sets `is_verified = true` and `last_login_at`.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError>;
}

/// Repository for OTP challenges.
pub trait ChallengeRepository: Send + Sync {
    /// Find the live (unused, unexpired) challenge for a phone number,
    /// most recently created first if more than one exists.
    async fn find_live(&self, phone_number: &str)
    -> Result<Option<OtpChallenge>, AuthServiceError>;

    /// Atomically supersede all live challenges for the phone number and
    /// insert the new challenge plus its delivery outbox event, in one
    /// transaction. Guarantees at most one live challenge per number.
    async fn create_replacing_live(
        &self,
        challenge: &OtpChallenge,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError>;

    /// Atomically increment the attempt counter (`attempts = attempts + 1`).
    /// The increment is persisted before the caller surfaces any error.
    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), AuthServiceError>;

    /// Mark a challenge used, guarded on `used_at IS NULL`. Returns `false`
    /// when the challenge was already consumed — a concurrent verification
    /// won the race and this one must be rejected.
    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    /// Purge challenges past their expiry. Returns the number removed.
    async fn delete_expired(&self) -> Result<u64, AuthServiceError>;
}
