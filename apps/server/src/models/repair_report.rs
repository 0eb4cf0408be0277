//! Repair report DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{alarm, repair_job, repair_report};

/// Outcome of the best-effort notification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Summary email accepted by the relay
    Sent,
    /// Dispatch failed; the report is still stored
    Failed,
    /// Mail is not configured
    Skipped,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportResponse {
    /// Always "success".
    pub status: String,
    pub message: String,
    /// Primary key of the stored report.
    pub report_id: i32,
    /// Secondary detail: what happened to the summary email.
    pub notification: NotificationStatus,
    /// Number of attachments included in the email.
    pub attachments: usize,
}

/// One stored repair job.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepairJobResponse {
    pub id: i32,
    pub job_code: Option<String>,
    pub description: Option<String>,
    pub part_number: Option<String>,
    pub part_description: Option<String>,
    pub quantity: i32,
    pub damage_type: Option<String>,
    pub old_serial: Option<String>,
    pub new_serial: Option<String>,
    pub labor_hours: f64,
}

impl From<repair_job::Model> for RepairJobResponse {
    fn from(job: repair_job::Model) -> Self {
        Self {
            id: job.id,
            job_code: job.job_code,
            description: job.description,
            part_number: job.part_number,
            part_description: job.part_description,
            quantity: job.quantity,
            damage_type: job.damage_type,
            old_serial: job.old_serial,
            new_serial: job.new_serial,
            labor_hours: job.labor_hours,
        }
    }
}

/// Full report with its jobs and alarms.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportDetailResponse {
    pub id: i32,
    pub container_number: String,
    pub report_date: NaiveDate,
    pub technician_name: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub warranty_id: Option<String>,
    pub warranty_status: Option<String>,
    pub setpoint: f64,
    pub vents: Option<String>,
    pub humidity: Option<String>,
    pub ambient_temp: f64,
    pub supply_temp_before: f64,
    pub supply_temp_after: f64,
    pub return_temp_before: f64,
    pub return_temp_after: f64,
    pub temp_in_range: Option<String>,
    pub problem_description: Option<String>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub jobs: Vec<RepairJobResponse>,
    pub alarms: Vec<String>,
}

impl ReportDetailResponse {
    pub fn new(
        report: repair_report::Model,
        jobs: Vec<repair_job::Model>,
        alarms: Vec<alarm::Model>,
    ) -> Self {
        Self {
            id: report.id,
            container_number: report.container_number,
            report_date: report.report_date,
            technician_name: report.technician_name,
            model: report.model,
            serial_number: report.serial_number,
            warranty_id: report.warranty_id,
            warranty_status: report.warranty_status,
            setpoint: report.setpoint,
            vents: report.vents,
            humidity: report.humidity,
            ambient_temp: report.ambient_temp,
            supply_temp_before: report.supply_temp_before,
            supply_temp_after: report.supply_temp_after,
            return_temp_before: report.return_temp_before,
            return_temp_after: report.return_temp_after,
            temp_in_range: report.temp_in_range,
            problem_description: report.problem_description,
            comments: report.comments,
            created_at: report.created_at,
            jobs: jobs.into_iter().map(RepairJobResponse::from).collect(),
            alarms: alarms.into_iter().map(|a| a.alarm_code).collect(),
        }
    }
}
