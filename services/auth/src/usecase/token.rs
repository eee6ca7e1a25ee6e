use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use chatwire_auth_types::token::{JwtClaims, validate_token};

use crate::domain::repository::{ChallengeRepository, UserRepository};
use crate::domain::types::{DeviceClass, MAX_OTP_ATTEMPTS, User, UserSummary};
use crate::error::AuthServiceError;

/// Token-issuance policy: which secret, which expiry, per device class.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret for web and mobile access tokens.
    pub primary_secret: String,
    /// Separate secret for mobile refresh tokens, so a leaked access token
    /// can never be replayed against the refresh endpoint.
    pub refresh_secret: String,
    /// Mobile access-token lifetime in seconds.
    pub access_expiry_secs: u64,
    /// Mobile refresh-token lifetime in seconds.
    pub refresh_expiry_secs: u64,
    /// Web token lifetime in seconds; the long expiry substitutes for a
    /// refresh flow that browsers do not get.
    pub web_expiry_secs: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

fn sign(user: &User, secret: &str, expiry_secs: u64) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + expiry_secs;
    let claims = JwtClaims {
        sub: user.id.to_string(),
        phone_number: user.phone_number.clone(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

pub fn issue_web_token(user: &User, cfg: &TokenConfig) -> Result<(String, u64), AuthServiceError> {
    sign(user, &cfg.primary_secret, cfg.web_expiry_secs)
}

pub fn issue_access_token(
    user: &User,
    cfg: &TokenConfig,
) -> Result<(String, u64), AuthServiceError> {
    sign(user, &cfg.primary_secret, cfg.access_expiry_secs)
}

pub fn issue_refresh_token(user: &User, cfg: &TokenConfig) -> Result<String, AuthServiceError> {
    let (token, _) = sign(user, &cfg.refresh_secret, cfg.refresh_expiry_secs)?;
    Ok(token)
}

/// Credentials produced for a successful verification.
#[derive(Debug)]
pub enum IssuedTokens {
    /// Browsers get one long-lived token, delivered as a cookie.
    Web { token: String, token_exp: u64 },
    /// Mobile clients get a short-lived access token plus a separately-keyed
    /// refresh token, both in the response body.
    Mobile {
        access_token: String,
        access_token_exp: u64,
        refresh_token: String,
    },
}

pub fn issue_tokens(
    user: &User,
    device: DeviceClass,
    cfg: &TokenConfig,
) -> Result<IssuedTokens, AuthServiceError> {
    match device {
        DeviceClass::Web => {
            let (token, token_exp) = issue_web_token(user, cfg)?;
            Ok(IssuedTokens::Web { token, token_exp })
        }
        DeviceClass::Mobile => {
            let (access_token, access_token_exp) = issue_access_token(user, cfg)?;
            let refresh_token = issue_refresh_token(user, cfg)?;
            Ok(IssuedTokens::Mobile {
                access_token,
                access_token_exp,
                refresh_token,
            })
        }
    }
}

// ── VerifyOtp (login) ─────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub phone_number: String,
    pub code: String,
    pub device: DeviceClass,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    pub user: UserSummary,
    pub tokens: IssuedTokens,
}

/// Verify a submitted OTP code and log the user in.
///
/// Each step's persistence is final before the next begins: a failed
/// comparison increments `attempts` before the error returns, and the
/// challenge is marked used before the user upsert and token issuance.
pub struct VerifyOtpUseCase<U, C>
where
    U: UserRepository,
    C: ChallengeRepository,
{
    pub users: U,
    pub challenges: C,
    pub tokens: TokenConfig,
}

impl<U, C> VerifyOtpUseCase<U, C>
where
    U: UserRepository,
    C: ChallengeRepository,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, AuthServiceError> {
        // 1. Live challenge lookup; absence covers "never requested" and
        //    "expired" alike.
        let challenge = self
            .challenges
            .find_live(&input.phone_number)
            .await?
            .ok_or(AuthServiceError::ChallengeNotFound)?;

        // 2. A challenge past its attempt budget is dead regardless of the
        //    submitted code.
        if challenge.attempts >= MAX_OTP_ATTEMPTS {
            return Err(AuthServiceError::AttemptsExceeded);
        }

        // 3. Exact string comparison; mismatch consumes an attempt.
        if challenge.code != input.code {
            self.challenges.record_failed_attempt(challenge.id).await?;
            return Err(AuthServiceError::InvalidCode);
        }

        // 4. Consume the challenge. A lost race means someone else already
        //    verified it; to this caller the challenge no longer exists.
        if !self.challenges.mark_used(challenge.id).await? {
            return Err(AuthServiceError::ChallengeNotFound);
        }

        // 5. Find-or-create the user; verification proves control of the
        //    phone number either way.
        let now = Utc::now();
        let user = match self.users.find_by_phone(&input.phone_number).await? {
            Some(existing) => {
                self.users.record_login(existing.id, now).await?;
                User {
                    is_verified: true,
                    last_login_at: Some(now),
                    ..existing
                }
            }
            None => {
                let user = User {
                    id: Uuid::new_v4(),
                    phone_number: input.phone_number.clone(),
                    email: None,
                    name: None,
                    is_active: true,
                    is_verified: true,
                    last_login_at: Some(now),
                    created_at: now,
                };
                self.users.create(&user).await?;
                user
            }
        };

        // 6. Hand off to the token issuer.
        let tokens = issue_tokens(&user, input.device, &self.tokens)?;
        Ok(VerifyOtpOutput {
            user: UserSummary::from(&user),
            tokens,
        })
    }
}

// ── RefreshAccessToken ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub access_token: String,
    pub access_token_exp: u64,
}

/// Mint a new access token from a valid refresh token.
///
/// Stateless rotation: the refresh token itself is never rotated and stays
/// valid until its own expiry. Every failure — bad signature, expiry,
/// unknown subject, deactivated user — surfaces the identical
/// `InvalidRefreshToken` so the caller cannot tell which check failed.
pub struct RefreshTokenUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
    pub tokens: TokenConfig,
}

impl<U> RefreshTokenUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<RefreshTokenOutput, AuthServiceError> {
        let claims = validate_token(refresh_token_value, &self.tokens.refresh_secret)
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::InvalidRefreshToken)?;

        if !user.is_active {
            return Err(AuthServiceError::InvalidRefreshToken);
        }

        let (access_token, access_token_exp) = issue_access_token(&user, &self.tokens)?;
        Ok(RefreshTokenOutput {
            access_token,
            access_token_exp,
        })
    }
}
