use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to users: challenges are keyed by phone number
        // value and may precede the user's creation.
        manager
            .create_table(
                Table::create()
                    .table(OtpChallenges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpChallenges::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OtpChallenges::PhoneNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpChallenges::Code).string().not_null())
                    .col(
                        ColumnDef::new(OtpChallenges::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpChallenges::UsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpChallenges::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpChallenges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpChallenges::Table)
                    .col(OtpChallenges::PhoneNumber)
                    .name("idx_otp_challenges_phone_number")
                    .to_owned(),
            )
            .await?;

        // The periodic expiry sweep filters on expires_at.
        manager
            .create_index(
                Index::create()
                    .table(OtpChallenges::Table)
                    .col(OtpChallenges::ExpiresAt)
                    .name("idx_otp_challenges_expires_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpChallenges::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpChallenges {
    Table,
    Id,
    PhoneNumber,
    Code,
    ExpiresAt,
    UsedAt,
    Attempts,
    CreatedAt,
}
