//! Migration: Create alarms table.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_repair_reports::RepairReports;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alarms::Table)
                    .if_not_exists()
                    .col(pk_auto(Alarms::Id))
                    .col(integer(Alarms::ReportId))
                    .col(string_len(Alarms::AlarmCode, 100))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alarms_report_id")
                            .from(Alarms::Table, Alarms::ReportId)
                            .to(RepairReports::Table, RepairReports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alarms_report_id")
                    .table(Alarms::Table)
                    .col(Alarms::ReportId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alarms::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Alarms {
    Table,
    Id,
    ReportId,
    AlarmCode,
}
