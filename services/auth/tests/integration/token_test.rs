use chrono::Utc;

use chatwire_auth::domain::types::DeviceClass;
use chatwire_auth::error::AuthServiceError;
use chatwire_auth::usecase::token::{
    IssuedTokens, RefreshTokenUseCase, VerifyOtpInput, VerifyOtpUseCase, issue_access_token,
    issue_refresh_token,
};
use chatwire_auth_types::token::validate_token;

use crate::helpers::{
    ContendedChallengeRepo, MockChallengeRepo, MockUserRepo, TEST_JWT_SECRET, TEST_PHONE,
    TEST_REFRESH_SECRET, test_challenge, test_token_config, test_user,
};

fn verify_usecase(
    users: MockUserRepo,
    challenges: MockChallengeRepo,
) -> VerifyOtpUseCase<MockUserRepo, MockChallengeRepo> {
    VerifyOtpUseCase {
        users,
        challenges,
        tokens: test_token_config(),
    }
}

fn verify_input(code: &str, device: DeviceClass) -> VerifyOtpInput {
    VerifyOtpInput {
        phone_number: TEST_PHONE.to_owned(),
        code: code.to_owned(),
        device,
    }
}

// ── VerifyOtp: web ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_single_web_token_and_create_user_on_first_verification() {
    let challenge = test_challenge(TEST_PHONE, "042517");

    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();
    let uc = verify_usecase(users, MockChallengeRepo::new(vec![challenge]));

    let out = uc
        .execute(verify_input("042517", DeviceClass::Web))
        .await
        .unwrap();

    // One token bound to {sub, phone_number}, signed with the primary secret.
    let IssuedTokens::Web { token, token_exp } = out.tokens else {
        panic!("web verification should yield a single web token");
    };
    let claims = validate_token(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.phone_number, TEST_PHONE);
    assert_eq!(claims.exp, token_exp);

    // Exactly one user materialized, verified, with a login timestamp.
    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1, "first verification creates exactly one user");
    let user = &users[0];
    assert_eq!(user.phone_number, TEST_PHONE);
    assert!(user.is_verified);
    assert!(user.is_active);
    assert!(user.last_login_at.is_some());

    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(out.user.id, user.id);
    assert_eq!(out.user.phone_number, TEST_PHONE);
}

#[tokio::test]
async fn should_reject_reuse_of_a_verified_challenge() {
    let challenge = test_challenge(TEST_PHONE, "042517");

    let uc = verify_usecase(MockUserRepo::empty(), MockChallengeRepo::new(vec![challenge]));

    uc.execute(verify_input("042517", DeviceClass::Web))
        .await
        .unwrap();

    // The challenge is consumed; replaying the same code finds nothing live.
    let result = uc.execute(verify_input("042517", DeviceClass::Web)).await;
    assert!(
        matches!(result, Err(AuthServiceError::ChallengeNotFound)),
        "expected ChallengeNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_challenge_not_found_when_concurrent_verification_wins() {
    let challenge = test_challenge(TEST_PHONE, "042517");

    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();
    let uc = VerifyOtpUseCase {
        users,
        challenges: ContendedChallengeRepo::new(challenge),
        tokens: test_token_config(),
    };

    // The code is correct, but the single-use consume loses to a concurrent
    // verification between the read and the conditional update. The loser
    // gets the same signal as a missing challenge and walks away with nothing.
    let result = uc.execute(verify_input("042517", DeviceClass::Web)).await;
    assert!(
        matches!(result, Err(AuthServiceError::ChallengeNotFound)),
        "expected ChallengeNotFound, got {result:?}"
    );
    assert!(
        users_handle.lock().unwrap().is_empty(),
        "losing verification must not materialize a user"
    );
}

// ── VerifyOtp: mobile ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_access_and_refresh_tokens_with_distinct_secrets_for_mobile() {
    let challenge = test_challenge(TEST_PHONE, "042517");

    let uc = verify_usecase(MockUserRepo::empty(), MockChallengeRepo::new(vec![challenge]));

    let out = uc
        .execute(verify_input("042517", DeviceClass::Mobile))
        .await
        .unwrap();

    let IssuedTokens::Mobile {
        access_token,
        access_token_exp,
        refresh_token,
    } = out.tokens
    else {
        panic!("mobile verification should yield an access + refresh pair");
    };

    // Access token: primary secret only.
    let access_claims = validate_token(&access_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(access_claims.exp, access_token_exp);
    assert!(validate_token(&access_token, TEST_REFRESH_SECRET).is_err());

    // Refresh token: refresh secret only.
    let refresh_claims = validate_token(&refresh_token, TEST_REFRESH_SECRET).unwrap();
    assert_eq!(refresh_claims.phone_number, TEST_PHONE);
    assert!(validate_token(&refresh_token, TEST_JWT_SECRET).is_err());

    // Access expiry is short (15 min), refresh expiry long (7 days).
    assert!(refresh_claims.exp > access_claims.exp);
}

// ── VerifyOtp: failure paths ─────────────────────────────────────────────────

#[tokio::test]
async fn should_fail_with_challenge_not_found_when_none_requested() {
    let uc = verify_usecase(MockUserRepo::empty(), MockChallengeRepo::empty());

    let result = uc.execute(verify_input("042517", DeviceClass::Web)).await;
    assert!(
        matches!(result, Err(AuthServiceError::ChallengeNotFound)),
        "expected ChallengeNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_with_challenge_not_found_when_expired() {
    let mut challenge = test_challenge(TEST_PHONE, "042517");
    challenge.expires_at = Utc::now() - chrono::Duration::minutes(1);

    let uc = verify_usecase(MockUserRepo::empty(), MockChallengeRepo::new(vec![challenge]));

    // Correct code, but past expiry: the challenge is unusable regardless of
    // attempts remaining.
    let result = uc.execute(verify_input("042517", DeviceClass::Web)).await;
    assert!(
        matches!(result, Err(AuthServiceError::ChallengeNotFound)),
        "expected ChallengeNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_consume_an_attempt_on_wrong_code() {
    let challenge = test_challenge(TEST_PHONE, "042517");
    let challenge_id = challenge.id;

    let challenges = MockChallengeRepo::new(vec![challenge]);
    let challenges_handle = challenges.challenges_handle();
    let uc = verify_usecase(MockUserRepo::empty(), challenges);

    let result = uc.execute(verify_input("000000", DeviceClass::Web)).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );

    // The increment persisted before the error surfaced.
    let challenges = challenges_handle.lock().unwrap();
    let stored = challenges.iter().find(|c| c.id == challenge_id).unwrap();
    assert_eq!(stored.attempts, 1);
    assert!(stored.used_at.is_none(), "a failed attempt does not consume the challenge");
}

#[tokio::test]
async fn should_exhaust_challenge_after_three_wrong_codes() {
    let challenge = test_challenge(TEST_PHONE, "042517");

    let challenges = MockChallengeRepo::new(vec![challenge]);
    let challenges_handle = challenges.challenges_handle();
    let uc = verify_usecase(MockUserRepo::empty(), challenges);

    for wrong in ["000000", "111111", "222222"] {
        let result = uc.execute(verify_input(wrong, DeviceClass::Web)).await;
        assert!(
            matches!(result, Err(AuthServiceError::InvalidCode)),
            "expected InvalidCode for {wrong}, got {result:?}"
        );
    }

    assert_eq!(challenges_handle.lock().unwrap()[0].attempts, 3);

    // Even the correct code is dead once the attempt budget is spent.
    let result = uc.execute(verify_input("042517", DeviceClass::Web)).await;
    assert!(
        matches!(result, Err(AuthServiceError::AttemptsExceeded)),
        "expected AttemptsExceeded, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_create_duplicate_user_on_repeat_verification() {
    let mut existing = test_user(TEST_PHONE);
    existing.is_verified = false;
    existing.last_login_at = None;
    let existing_id = existing.id;

    let challenge = test_challenge(TEST_PHONE, "042517");

    let users = MockUserRepo::new(vec![existing]);
    let users_handle = users.users_handle();
    let uc = verify_usecase(users, MockChallengeRepo::new(vec![challenge]));

    let out = uc
        .execute(verify_input("042517", DeviceClass::Web))
        .await
        .unwrap();

    assert_eq!(out.user.id, existing_id);

    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1, "repeat verification must not duplicate the user");
    assert!(users[0].is_verified, "verification flips is_verified");
    assert!(users[0].last_login_at.is_some(), "login timestamp recorded");
}

// ── RefreshAccessToken ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_new_access_token_only_from_valid_refresh_token() {
    let user = test_user(TEST_PHONE);
    let cfg = test_token_config();
    let refresh = issue_refresh_token(&user, &cfg).unwrap();

    let uc = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        tokens: cfg,
    };

    let out = uc.execute(&refresh).await.unwrap();

    let claims = validate_token(&out.access_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.phone_number, TEST_PHONE);
    assert_eq!(claims.exp, out.access_token_exp);
}

#[tokio::test]
async fn should_reject_refresh_with_token_signed_by_primary_secret() {
    let user = test_user(TEST_PHONE);
    let cfg = test_token_config();
    // Well-formed, unexpired — but signed with the access (primary) secret.
    let (access, _) = issue_access_token(&user, &cfg).unwrap();

    let uc = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user]),
        tokens: cfg,
    };

    let result = uc.execute(&access).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidRefreshToken)),
        "expected InvalidRefreshToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_with_garbage_token() {
    let uc = RefreshTokenUseCase {
        users: MockUserRepo::empty(),
        tokens: test_token_config(),
    };

    let result = uc.execute("not-a-valid-jwt").await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidRefreshToken)),
        "expected InvalidRefreshToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_when_user_no_longer_exists() {
    let user = test_user(TEST_PHONE);
    let cfg = test_token_config();
    let refresh = issue_refresh_token(&user, &cfg).unwrap();

    let uc = RefreshTokenUseCase {
        users: MockUserRepo::empty(),
        tokens: cfg,
    };

    let result = uc.execute(&refresh).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidRefreshToken)),
        "expected InvalidRefreshToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_refresh_for_deactivated_user() {
    let mut user = test_user(TEST_PHONE);
    let cfg = test_token_config();
    let refresh = issue_refresh_token(&user, &cfg).unwrap();
    user.is_active = false;

    let uc = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user]),
        tokens: cfg,
    };

    // Deactivation rejects the very next refresh, identical signal to a bad
    // token.
    let result = uc.execute(&refresh).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidRefreshToken)),
        "expected InvalidRefreshToken, got {result:?}"
    );
}
