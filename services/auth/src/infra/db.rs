use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use chatwire_auth_schema::{otp_challenges, outbox_events, users};

use crate::domain::repository::{ChallengeRepository, UserRepository};
use crate::domain::types::{OtpChallenge, OutboxEvent, User};
use crate::error::AuthServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await
            .context("find user by phone")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user.id),
            phone_number: Set(user.phone_number.clone()),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            is_active: Set(user.is_active),
            is_verified: Set(user.is_verified),
            last_login_at: Set(user.last_login_at),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            is_verified: Set(true),
            last_login_at: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record user login")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        phone_number: model.phone_number,
        email: model.email,
        name: model.name,
        is_active: model.is_active,
        is_verified: model.is_verified,
        last_login_at: model.last_login_at,
        created_at: model.created_at,
    }
}

// ── Challenge repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbChallengeRepository {
    pub db: DatabaseConnection,
}

impl ChallengeRepository for DbChallengeRepository {
    async fn find_live(
        &self,
        phone_number: &str,
    ) -> Result<Option<OtpChallenge>, AuthServiceError> {
        let now = Utc::now();
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::PhoneNumber.eq(phone_number))
            .filter(otp_challenges::Column::UsedAt.is_null())
            .filter(otp_challenges::Column::ExpiresAt.gt(now))
            .order_by_desc(otp_challenges::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find live otp challenge")?;
        Ok(model.map(challenge_from_model))
    }

    async fn create_replacing_live(
        &self,
        challenge: &OtpChallenge,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let challenge = challenge.clone();
                let event = event.clone();
                Box::pin(async move {
                    invalidate_live_challenges(txn, &challenge.phone_number).await?;
                    insert_challenge(txn, &challenge).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create otp challenge replacing live")?;
        Ok(())
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), AuthServiceError> {
        // Single-statement increment; two concurrent failures both count.
        otp_challenges::Entity::update_many()
            .col_expr(
                otp_challenges::Column::Attempts,
                Expr::col(otp_challenges::Column::Attempts).add(1),
            )
            .filter(otp_challenges::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("record failed otp attempt")?;
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        // Guarded on used_at IS NULL so only one of two concurrent
        // verifications can consume the challenge.
        let now = Utc::now();
        let result = otp_challenges::Entity::update_many()
            .col_expr(otp_challenges::Column::UsedAt, Expr::value(Some(now)))
            .filter(otp_challenges::Column::Id.eq(id))
            .filter(otp_challenges::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("mark otp challenge used")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_expired(&self) -> Result<u64, AuthServiceError> {
        let now = Utc::now();
        let result = otp_challenges::Entity::delete_many()
            .filter(otp_challenges::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired otp challenges")?;
        Ok(result.rows_affected)
    }
}

async fn invalidate_live_challenges(
    txn: &DatabaseTransaction,
    phone_number: &str,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    otp_challenges::Entity::update_many()
        .col_expr(otp_challenges::Column::UsedAt, Expr::value(Some(now)))
        .filter(otp_challenges::Column::PhoneNumber.eq(phone_number))
        .filter(otp_challenges::Column::UsedAt.is_null())
        .exec(txn)
        .await?;
    Ok(())
}

async fn insert_challenge(
    txn: &DatabaseTransaction,
    challenge: &OtpChallenge,
) -> Result<(), sea_orm::DbErr> {
    otp_challenges::ActiveModel {
        id: Set(challenge.id),
        phone_number: Set(challenge.phone_number.clone()),
        code: Set(challenge.code.clone()),
        expires_at: Set(challenge.expires_at),
        used_at: Set(None),
        attempts: Set(0),
        created_at: Set(challenge.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn challenge_from_model(model: otp_challenges::Model) -> OtpChallenge {
    OtpChallenge {
        id: model.id,
        phone_number: model.phone_number,
        code: model.code,
        expires_at: model.expires_at,
        used_at: model.used_at,
        attempts: model.attempts,
        created_at: model.created_at,
    }
}
