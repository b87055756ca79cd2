//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(User::Username).string_len(128).not_null())
                    .col(ColumnDef::new(User::Email).string_len(256).not_null())
                    .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
                    .col(ColumnDef::new(User::ApiToken).string_len(64))
                    .col(ColumnDef::new(User::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::Status).string_len(16).not_null().default("active"))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique: username within a tenant
        manager
            .create_index(
                Index::create()
                    .name("idx_user_tenant_username")
                    .table(User::Table)
                    .col(User::TenantId)
                    .col(User::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: api_token (for bearer-token auth lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_api_token")
                    .table(User::Table)
                    .col(User::ApiToken)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    TenantId,
    Username,
    Email,
    PasswordHash,
    ApiToken,
    IsAdmin,
    Status,
    CreatedAt,
    UpdatedAt,
}
