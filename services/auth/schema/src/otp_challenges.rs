use sea_orm::entity::prelude::*;

/// One-time-passcode challenge sent to a phone number.
///
/// Keyed by phone number *value*, not by user id — the user may not exist
/// yet (users are created on first successful verification), so there is no
/// foreign key to `users`. Expires after 10 minutes; at most one live
/// (unused, unexpired) challenge per phone number.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub phone_number: String,
    pub code: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attempts: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
