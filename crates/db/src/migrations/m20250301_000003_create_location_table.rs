//! Create location table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Location::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Location::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Location::Status).string_len(16).not_null().default("active"))
                    .col(ColumnDef::new(Location::ParentId).string_len(32))
                    .col(ColumnDef::new(Location::Lft).big_integer().not_null())
                    .col(ColumnDef::new(Location::Rgt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_parent")
                            .from(Location::Table, Location::ParentId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: lft / rgt (interval scans and ordering). Not unique: range
        // renumbering shifts bounds in bulk and transient collisions within
        // a statement must not trip a constraint.
        manager
            .create_index(
                Index::create()
                    .name("idx_location_lft")
                    .table(Location::Table)
                    .col(Location::Lft)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_location_rgt")
                    .table(Location::Table)
                    .col(Location::Rgt)
                    .to_owned(),
            )
            .await?;

        // Index: parent_id (direct children listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_location_parent")
                    .table(Location::Table)
                    .col(Location::ParentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Location::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Location {
    Table,
    Id,
    Title,
    Status,
    ParentId,
    Lft,
    Rgt,
}
