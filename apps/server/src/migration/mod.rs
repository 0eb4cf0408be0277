//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_repair_reports;
mod m20250301_000002_create_repair_jobs;
mod m20250301_000003_create_alarms;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_repair_reports::Migration),
            Box::new(m20250301_000002_create_repair_jobs::Migration),
            Box::new(m20250301_000003_create_alarms::Migration),
        ]
    }
}
