//! Migration: Create repair_reports table.
//!
//! One row per submitted repair visit. Rows are written once and never updated.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RepairReports::Table)
                    .if_not_exists()
                    .col(pk_auto(RepairReports::Id))
                    .col(string_len(RepairReports::ContainerNumber, 11))
                    .col(date(RepairReports::ReportDate))
                    .col(string_len(RepairReports::TechnicianName, 100))
                    .col(string_len_null(RepairReports::Model, 100))
                    .col(string_len_null(RepairReports::SerialNumber, 100))
                    .col(string_len_null(RepairReports::WarrantyId, 100))
                    .col(string_len_null(RepairReports::WarrantyStatus, 100))
                    .col(double(RepairReports::Setpoint).default(0.0))
                    .col(string_len_null(RepairReports::Vents, 50))
                    .col(string_len_null(RepairReports::Humidity, 50))
                    .col(double(RepairReports::AmbientTemp).default(0.0))
                    .col(double(RepairReports::SupplyTempBefore).default(0.0))
                    .col(double(RepairReports::SupplyTempAfter).default(0.0))
                    .col(double(RepairReports::ReturnTempBefore).default(0.0))
                    .col(double(RepairReports::ReturnTempAfter).default(0.0))
                    .col(string_len_null(RepairReports::TempInRange, 50))
                    .col(text_null(RepairReports::ProblemDescription))
                    .col(text_null(RepairReports::Comments))
                    .col(
                        timestamp_with_time_zone(RepairReports::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repair_reports_container_number")
                    .table(RepairReports::Table)
                    .col(RepairReports::ContainerNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repair_reports_created_at")
                    .table(RepairReports::Table)
                    .col(RepairReports::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RepairReports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum RepairReports {
    Table,
    Id,
    ContainerNumber,
    ReportDate,
    TechnicianName,
    Model,
    SerialNumber,
    WarrantyId,
    WarrantyStatus,
    Setpoint,
    Vents,
    Humidity,
    AmbientTemp,
    SupplyTempBefore,
    SupplyTempAfter,
    ReturnTempBefore,
    ReturnTempAfter,
    TempInRange,
    ProblemDescription,
    Comments,
    CreatedAt,
}
