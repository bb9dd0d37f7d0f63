use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240101_000001_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blogs::Table)
                    .if_not_exists()
                    .col(uuid(Blogs::Id).primary_key())
                    .col(uuid(Blogs::AuthorId))
                    .col(string(Blogs::Title))
                    .col(text(Blogs::Content))
                    .col(text_null(Blogs::Excerpt))
                    .col(boolean(Blogs::Published).default(false))
                    .col(boolean(Blogs::Verified).default(false))
                    .col(boolean(Blogs::VerificationRequested).default(false))
                    .col(timestamp_with_time_zone_null(Blogs::VerifiedAt))
                    .col(
                        timestamp_with_time_zone(Blogs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(string_null(Blogs::BackgroundImageUrl))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blogs_author")
                            .from(Blogs::Table, Blogs::AuthorId)
                            .to(Profiles::Table, Profiles::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Backs the pending-queue filter.
        manager
            .create_index(
                Index::create()
                    .name("idx_blogs_review_state")
                    .table(Blogs::Table)
                    .col(Blogs::VerificationRequested)
                    .col(Blogs::Verified)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blogs_created_at")
                    .table(Blogs::Table)
                    .col(Blogs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Blogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Blogs {
    Table,
    Id,
    AuthorId,
    Title,
    Content,
    Excerpt,
    Published,
    Verified,
    VerificationRequested,
    VerifiedAt,
    CreatedAt,
    BackgroundImageUrl,
}
