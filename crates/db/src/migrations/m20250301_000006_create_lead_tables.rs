//! Create lead and `lead_stage` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lead::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Lead::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Lead::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(Lead::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Lead::ClientId).string_len(32))
                    .col(ColumnDef::new(Lead::ContactId).string_len(32))
                    .col(ColumnDef::new(Lead::PipelineId).string_len(32).not_null())
                    .col(ColumnDef::new(Lead::StageId).string_len(32).not_null())
                    .col(ColumnDef::new(Lead::Status).string_len(16).not_null().default("open"))
                    .col(ColumnDef::new(Lead::Source).string_len(128))
                    .col(ColumnDef::new(Lead::AssignedTo).string_len(32))
                    .col(
                        ColumnDef::new(Lead::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Lead::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_pipeline")
                            .from(Lead::Table, Lead::PipelineId)
                            .to(Pipeline::Table, Pipeline::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_stage")
                            .from(Lead::Table, Lead::StageId)
                            .to(Stage::Table, Stage::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_tenant")
                    .table(Lead::Table)
                    .col(Lead::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_stage_current")
                    .table(Lead::Table)
                    .col(Lead::StageId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadStage::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LeadStage::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(LeadStage::LeadId).string_len(32).not_null())
                    .col(ColumnDef::new(LeadStage::StageId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(LeadStage::EnteredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LeadStage::ExitedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_stage_lead")
                            .from(LeadStage::Table, LeadStage::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_stage_stage")
                            .from(LeadStage::Table, LeadStage::StageId)
                            .to(Stage::Table, Stage::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: lead_id + exited_at (finding the open history row)
        manager
            .create_index(
                Index::create()
                    .name("idx_lead_stage_lead_open")
                    .table(LeadStage::Table)
                    .col(LeadStage::LeadId)
                    .col(LeadStage::ExitedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeadStage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lead::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
    TenantId,
    Title,
    ClientId,
    ContactId,
    PipelineId,
    StageId,
    Status,
    Source,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeadStage {
    Table,
    Id,
    LeadId,
    StageId,
    EnteredAt,
    ExitedAt,
}

#[derive(DeriveIden)]
enum Pipeline {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Stage {
    Table,
    Id,
}
