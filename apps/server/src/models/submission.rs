//! Validated, typed submission ready to be persisted.

use chrono::NaiveDate;
use serde::Serialize;

/// Report attributes after validation and numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportInput {
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
}

/// One repair action. Absent numeric fields take their defaults
/// (quantity 1, labor hours 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobInput {
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

impl Default for JobInput {
    fn default() -> Self {
        Self {
            job_code: None,
            description: None,
            part_number: None,
            part_description: None,
            quantity: 1,
            damage_type: None,
            old_serial: None,
            new_serial: None,
            labor_hours: 0.0,
        }
    }
}

/// A report with its jobs and alarm codes, built from one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub report: ReportInput,
    pub jobs: Vec<JobInput>,
    /// Trimmed, non-empty alarm codes
    pub alarms: Vec<String>,
}
