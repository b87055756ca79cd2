//! Create deal table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Deal::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deal::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Deal::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(Deal::ClientId).string_len(32).not_null())
                    .col(ColumnDef::new(Deal::LeadId).string_len(32))
                    .col(ColumnDef::new(Deal::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Deal::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Deal::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Deal::Status).string_len(16).not_null().default("open"))
                    .col(ColumnDef::new(Deal::ClosedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Deal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_client")
                            .from(Deal::Table, Deal::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deal_lead")
                            .from(Deal::Table, Deal::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deal_tenant")
                    .table(Deal::Table)
                    .col(Deal::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deal_status")
                    .table(Deal::Table)
                    .col(Deal::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deal::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Deal {
    Table,
    Id,
    TenantId,
    ClientId,
    LeadId,
    Title,
    AmountCents,
    Currency,
    Status,
    ClosedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Client {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
}
