//! Create client and contact tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Client::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Client::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(Client::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Client::Email).string_len(256))
                    .col(ColumnDef::new(Client::Phone).string_len(64))
                    .col(ColumnDef::new(Client::LocationId).string_len(32))
                    .col(ColumnDef::new(Client::Status).string_len(16).not_null().default("active"))
                    .col(ColumnDef::new(Client::Notes).text())
                    .col(
                        ColumnDef::new(Client::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Client::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_location")
                            .from(Client::Table, Client::LocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_client_tenant")
                    .table(Client::Table)
                    .col(Client::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_client_location")
                    .table(Client::Table)
                    .col(Client::LocationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contact::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contact::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Contact::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(Contact::ClientId).string_len(32).not_null())
                    .col(ColumnDef::new(Contact::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Contact::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(Contact::Email).string_len(256))
                    .col(ColumnDef::new(Contact::Phone).string_len(64))
                    .col(ColumnDef::new(Contact::Position).string_len(128))
                    .col(ColumnDef::new(Contact::LocationId).string_len(32))
                    .col(
                        ColumnDef::new(Contact::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_client")
                            .from(Contact::Table, Contact::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_location")
                            .from(Contact::Table, Contact::LocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contact_client")
                    .table(Contact::Table)
                    .col(Contact::ClientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contact::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Client::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Client {
    Table,
    Id,
    TenantId,
    Name,
    Email,
    Phone,
    LocationId,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contact {
    Table,
    Id,
    TenantId,
    ClientId,
    FirstName,
    LastName,
    Email,
    Phone,
    Position,
    LocationId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Location {
    Table,
    Id,
}
