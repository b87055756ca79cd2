//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250301_000001_create_user_table;
mod m20250301_000002_create_tier_and_activation_code_tables;
mod m20250301_000003_create_location_table;
mod m20250301_000004_create_client_and_contact_tables;
mod m20250301_000005_create_pipeline_and_stage_tables;
mod m20250301_000006_create_lead_tables;
mod m20250301_000007_create_deal_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_user_table::Migration),
            Box::new(m20250301_000002_create_tier_and_activation_code_tables::Migration),
            Box::new(m20250301_000003_create_location_table::Migration),
            Box::new(m20250301_000004_create_client_and_contact_tables::Migration),
            Box::new(m20250301_000005_create_pipeline_and_stage_tables::Migration),
            Box::new(m20250301_000006_create_lead_tables::Migration),
            Box::new(m20250301_000007_create_deal_table::Migration),
        ]
    }
}
