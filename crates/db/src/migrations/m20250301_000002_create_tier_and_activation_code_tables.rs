//! Create tier and `activation_code` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tier::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tier::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Tier::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Tier::Description).text())
                    .col(ColumnDef::new(Tier::PriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Tier::MaxUsers).integer().not_null())
                    .col(ColumnDef::new(Tier::MaxClients).integer().not_null())
                    .col(ColumnDef::new(Tier::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Tier::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActivationCode::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ActivationCode::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(ActivationCode::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(ActivationCode::Code).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(ActivationCode::TierId).string_len(32).not_null())
                    .col(ColumnDef::new(ActivationCode::UsedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ActivationCode::UsedBy).string_len(32))
                    .col(ColumnDef::new(ActivationCode::IsRevoked).boolean().not_null().default(false))
                    .col(ColumnDef::new(ActivationCode::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ActivationCode::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activation_code_tier")
                            .from(ActivationCode::Table, ActivationCode::TierId)
                            .to(Tier::Table, Tier::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: tenant_id (list queries are tenant-scoped)
        manager
            .create_index(
                Index::create()
                    .name("idx_activation_code_tenant")
                    .table(ActivationCode::Table)
                    .col(ActivationCode::TenantId)
                    .to_owned(),
            )
            .await?;

        // Index: used_at (using_state filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_activation_code_used_at")
                    .table(ActivationCode::Table)
                    .col(ActivationCode::UsedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivationCode::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tier::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tier {
    Table,
    Id,
    Name,
    Description,
    PriceCents,
    MaxUsers,
    MaxClients,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ActivationCode {
    Table,
    Id,
    TenantId,
    Code,
    TierId,
    UsedAt,
    UsedBy,
    IsRevoked,
    ExpiresAt,
    CreatedAt,
}
