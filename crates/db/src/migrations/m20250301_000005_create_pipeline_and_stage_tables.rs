//! Create pipeline and stage tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pipeline::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pipeline::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Pipeline::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(Pipeline::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Pipeline::IsDefault).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Pipeline::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pipeline_tenant")
                    .table(Pipeline::Table)
                    .col(Pipeline::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Stage::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stage::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Stage::PipelineId).string_len(32).not_null())
                    .col(ColumnDef::new(Stage::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Stage::Position).integer().not_null())
                    .col(
                        ColumnDef::new(Stage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stage_pipeline")
                            .from(Stage::Table, Stage::PipelineId)
                            .to(Pipeline::Table, Pipeline::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique: one position per pipeline
        manager
            .create_index(
                Index::create()
                    .name("idx_stage_pipeline_position")
                    .table(Stage::Table)
                    .col(Stage::PipelineId)
                    .col(Stage::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pipeline::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pipeline {
    Table,
    Id,
    TenantId,
    Name,
    IsDefault,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Stage {
    Table,
    Id,
    PipelineId,
    Name,
    Position,
    CreatedAt,
}
