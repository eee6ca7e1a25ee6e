use chrono::Utc;

use chatwire_auth::usecase::otp::{RequestOtpInput, RequestOtpUseCase};

use crate::helpers::{MockChallengeRepo, TEST_PHONE, test_challenge};

#[tokio::test]
async fn should_create_six_digit_challenge_with_ten_minute_expiry() {
    let mock_repo = MockChallengeRepo::empty();
    let challenges_handle = mock_repo.challenges_handle();

    let uc = RequestOtpUseCase {
        challenges: mock_repo,
    };

    uc.execute(RequestOtpInput {
        phone_number: TEST_PHONE.to_owned(),
    })
    .await
    .unwrap();

    let challenges = challenges_handle.lock().unwrap();
    assert_eq!(challenges.len(), 1, "expected exactly one challenge");

    let created = &challenges[0];
    assert_eq!(created.phone_number, TEST_PHONE);
    assert_eq!(created.code.len(), 6, "otp code should be 6 digits");
    let n: u32 = created.code.parse().expect("otp code should be numeric");
    assert!((100_000..=999_999).contains(&n));
    assert!(created.used_at.is_none(), "new challenge should be live");
    assert_eq!(created.attempts, 0);

    let ttl = created.expires_at - created.created_at;
    assert_eq!(ttl.num_minutes(), 10, "challenge TTL should be 10 minutes");
}

#[tokio::test]
async fn should_invalidate_previous_live_challenges_for_same_phone() {
    let old = test_challenge(TEST_PHONE, "111111");
    let old_id = old.id;

    let mock_repo = MockChallengeRepo::new(vec![old]);
    let challenges_handle = mock_repo.challenges_handle();

    let uc = RequestOtpUseCase {
        challenges: mock_repo,
    };

    uc.execute(RequestOtpInput {
        phone_number: TEST_PHONE.to_owned(),
    })
    .await
    .unwrap();

    let challenges = challenges_handle.lock().unwrap();
    let old = challenges.iter().find(|c| c.id == old_id).unwrap();
    assert!(
        old.used_at.is_some(),
        "previous challenge should be superseded"
    );

    let live: Vec<_> = challenges.iter().filter(|c| c.is_live()).collect();
    assert_eq!(live.len(), 1, "at most one live challenge per phone number");
}

#[tokio::test]
async fn should_not_touch_live_challenges_for_other_phones() {
    let other = test_challenge("+15550000000", "222222");
    let other_id = other.id;

    let mock_repo = MockChallengeRepo::new(vec![other]);
    let challenges_handle = mock_repo.challenges_handle();

    let uc = RequestOtpUseCase {
        challenges: mock_repo,
    };

    uc.execute(RequestOtpInput {
        phone_number: TEST_PHONE.to_owned(),
    })
    .await
    .unwrap();

    let challenges = challenges_handle.lock().unwrap();
    let other = challenges.iter().find(|c| c.id == other_id).unwrap();
    assert!(other.used_at.is_none(), "unrelated challenge stays live");
}

#[tokio::test]
async fn should_write_delivery_outbox_event_with_code() {
    let mock_repo = MockChallengeRepo::empty();
    let challenges_handle = mock_repo.challenges_handle();
    let events_handle = mock_repo.events_handle();

    let uc = RequestOtpUseCase {
        challenges: mock_repo,
    };

    uc.execute(RequestOtpInput {
        phone_number: TEST_PHONE.to_owned(),
    })
    .await
    .unwrap();

    let challenges = challenges_handle.lock().unwrap();
    let events = events_handle.lock().unwrap();
    assert_eq!(events.len(), 1, "expected one outbox event");

    let event = &events[0];
    assert_eq!(event.kind, "otp_requested");
    assert_eq!(event.payload["phone_number"], TEST_PHONE);
    assert_eq!(event.payload["code"], challenges[0].code);
    assert_eq!(
        event.idempotency_key,
        format!("otp_requested:{}", challenges[0].id)
    );
}

#[tokio::test]
async fn expired_challenges_are_swept() {
    use chatwire_auth::domain::repository::ChallengeRepository as _;

    let mut expired = test_challenge(TEST_PHONE, "333333");
    expired.expires_at = Utc::now() - chrono::Duration::minutes(1);
    let live = test_challenge("+15550000000", "444444");

    let mock_repo = MockChallengeRepo::new(vec![expired, live]);
    let challenges_handle = mock_repo.challenges_handle();

    let removed = mock_repo.delete_expired().await.unwrap();
    assert_eq!(removed, 1);

    let challenges = challenges_handle.lock().unwrap();
    assert_eq!(challenges.len(), 1);
    assert!(challenges[0].is_live());
}
