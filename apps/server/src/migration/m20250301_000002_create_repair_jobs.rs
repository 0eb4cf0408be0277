//! Migration: Create repair_jobs table.
//!
//! Jobs are the individual repair actions within a report and are removed
//! together with their report.

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
                    .table(RepairJobs::Table)
                    .if_not_exists()
                    .col(pk_auto(RepairJobs::Id))
                    .col(integer(RepairJobs::ReportId))
                    .col(string_len_null(RepairJobs::JobCode, 50))
                    .col(string_len_null(RepairJobs::Description, 255))
                    .col(string_len_null(RepairJobs::PartNumber, 100))
                    .col(string_len_null(RepairJobs::PartDescription, 255))
                    .col(integer(RepairJobs::Quantity).default(1))
                    .col(string_len_null(RepairJobs::DamageType, 50))
                    .col(string_len_null(RepairJobs::OldSerial, 100))
                    .col(string_len_null(RepairJobs::NewSerial, 100))
                    .col(double(RepairJobs::LaborHours).default(0.0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_repair_jobs_report_id")
                            .from(RepairJobs::Table, RepairJobs::ReportId)
                            .to(RepairReports::Table, RepairReports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repair_jobs_report_id")
                    .table(RepairJobs::Table)
                    .col(RepairJobs::ReportId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RepairJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RepairJobs {
    Table,
    Id,
    ReportId,
    JobCode,
    Description,
    PartNumber,
    PartDescription,
    Quantity,
    DamageType,
    OldSerial,
    NewSerial,
    LaborHours,
}
