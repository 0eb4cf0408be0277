//! Database queries for repair reports, jobs and alarms.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use tracing::{error, warn};

use crate::entity::alarm::{self, Entity as Alarm};
use crate::entity::repair_job::{self as job, Entity as RepairJob};
use crate::entity::repair_report::{self as report, Entity as RepairReport};
use crate::error::{AppError, AppResult};
use crate::models::{JobInput, ReportInput, Submission};

use super::DbPool;

/// A stored report together with its children.
pub type ReportTree = (report::Model, Vec<job::Model>, Vec<alarm::Model>);

impl DbPool {
    /// Insert a report, its jobs and its alarms as one unit of work.
    ///
    /// Returns the generated report id once the transaction has committed.
    /// On any failure the transaction is rolled back and no row of this
    /// submission remains.
    pub async fn persist_submission(&self, submission: &Submission) -> AppResult<i32> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        match insert_submission(&txn, submission).await {
            Ok(report_id) => {
                txn.commit().await.map_err(|e| {
                    AppError::Database(format!("Failed to commit report {}: {}", report_id, e))
                })?;
                Ok(report_id)
            }
            Err(e) => {
                error!(
                    "Rolling back submission for container {}: {}",
                    submission.report.container_number, e
                );
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Get a report by ID.
    pub async fn get_report_by_id(&self, id: i32) -> AppResult<Option<report::Model>> {
        let result = RepairReport::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get report: {}", e)))?;

        Ok(result)
    }

    /// Get all jobs for a report, in insertion order.
    pub async fn get_jobs_by_report_id(&self, report_id: i32) -> AppResult<Vec<job::Model>> {
        let result = RepairJob::find()
            .filter(job::Column::ReportId.eq(report_id))
            .order_by_asc(job::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get jobs for report: {}", e)))?;

        Ok(result)
    }

    /// Get all alarms for a report, in insertion order.
    pub async fn get_alarms_by_report_id(&self, report_id: i32) -> AppResult<Vec<alarm::Model>> {
        let result = Alarm::find()
            .filter(alarm::Column::ReportId.eq(report_id))
            .order_by_asc(alarm::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get alarms for report: {}", e)))?;

        Ok(result)
    }

    /// Get a report with its jobs and alarms.
    pub async fn get_report_detail(&self, id: i32) -> AppResult<Option<ReportTree>> {
        let Some(report) = self.get_report_by_id(id).await? else {
            return Ok(None);
        };
        let jobs = self.get_jobs_by_report_id(id).await?;
        let alarms = self.get_alarms_by_report_id(id).await?;

        Ok(Some((report, jobs, alarms)))
    }
}

/// Parent first, then children referencing the generated id.
async fn insert_submission<C>(db: &C, submission: &Submission) -> AppResult<i32>
where
    C: ConnectionTrait,
{
    let report = insert_report(db, &submission.report).await?;

    for job in &submission.jobs {
        insert_job(db, report.id, job).await?;
    }

    for code in &submission.alarms {
        insert_alarm(db, report.id, code).await?;
    }

    Ok(report.id)
}

async fn insert_report<C>(db: &C, input: &ReportInput) -> AppResult<report::Model>
where
    C: ConnectionTrait,
{
    let model = report::ActiveModel {
        id: NotSet,
        container_number: Set(input.container_number.clone()),
        report_date: Set(input.report_date),
        technician_name: Set(input.technician_name.clone()),
        model: Set(input.model.clone()),
        serial_number: Set(input.serial_number.clone()),
        warranty_id: Set(input.warranty_id.clone()),
        warranty_status: Set(input.warranty_status.clone()),
        setpoint: Set(input.setpoint),
        vents: Set(input.vents.clone()),
        humidity: Set(input.humidity.clone()),
        ambient_temp: Set(input.ambient_temp),
        supply_temp_before: Set(input.supply_temp_before),
        supply_temp_after: Set(input.supply_temp_after),
        return_temp_before: Set(input.return_temp_before),
        return_temp_after: Set(input.return_temp_after),
        temp_in_range: Set(input.temp_in_range.clone()),
        problem_description: Set(input.problem_description.clone()),
        comments: Set(input.comments.clone()),
        created_at: Set(Utc::now()),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert report: {}", e)))
}

async fn insert_job<C>(db: &C, report_id: i32, input: &JobInput) -> AppResult<job::Model>
where
    C: ConnectionTrait,
{
    let model = job::ActiveModel {
        id: NotSet,
        report_id: Set(report_id),
        job_code: Set(input.job_code.clone()),
        description: Set(input.description.clone()),
        part_number: Set(input.part_number.clone()),
        part_description: Set(input.part_description.clone()),
        quantity: Set(input.quantity),
        damage_type: Set(input.damage_type.clone()),
        old_serial: Set(input.old_serial.clone()),
        new_serial: Set(input.new_serial.clone()),
        labor_hours: Set(input.labor_hours),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert job: {}", e)))
}

async fn insert_alarm<C>(db: &C, report_id: i32, code: &str) -> AppResult<alarm::Model>
where
    C: ConnectionTrait,
{
    let model = alarm::ActiveModel {
        id: NotSet,
        report_id: Set(report_id),
        alarm_code: Set(code.to_string()),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert alarm: {}", e)))
}
