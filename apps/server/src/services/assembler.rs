//! Builds the typed report, job and alarm records from a raw field map.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::AppResult;
use crate::models::{FormFields, JobInput, ReportInput, Submission};

use super::validator::{
    CODE_LEN, DESCRIPTION_LEN, NAME_LEN, coerce_f64, coerce_i32, limit_text, optional_text,
    parse_job_count, parse_report_date, required_text, validate_container_number,
};

/// Repeated field carrying alarm codes.
pub const ALARM_FIELD: &str = "alarm[]";

/// `job[<index>][<field>]`
static JOB_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^job\[(\d+)\]\[([a-z_]+)\]$").expect("valid job field regex"));

/// The fixed set of per-job fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobField {
    Code,
    Description,
    PartNumber,
    PartDescription,
    Quantity,
    DamageType,
    OldSerial,
    NewSerial,
    LaborHours,
}

impl JobField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "code" => Some(Self::Code),
            "description" => Some(Self::Description),
            "part_number" => Some(Self::PartNumber),
            "part_description" => Some(Self::PartDescription),
            "quantity" => Some(Self::Quantity),
            "damage_type" => Some(Self::DamageType),
            "old_serial" => Some(Self::OldSerial),
            "new_serial" => Some(Self::NewSerial),
            "labor_hours" => Some(Self::LaborHours),
            _ => None,
        }
    }
}

/// Raw values collected for one job index.
#[derive(Debug, Default)]
struct RawJob {
    code: Option<String>,
    description: Option<String>,
    part_number: Option<String>,
    part_description: Option<String>,
    quantity: Option<String>,
    damage_type: Option<String>,
    old_serial: Option<String>,
    new_serial: Option<String>,
    labor_hours: Option<String>,
}

impl RawJob {
    fn set(&mut self, field: JobField, value: &str) {
        let slot = match field {
            JobField::Code => &mut self.code,
            JobField::Description => &mut self.description,
            JobField::PartNumber => &mut self.part_number,
            JobField::PartDescription => &mut self.part_description,
            JobField::Quantity => &mut self.quantity,
            JobField::DamageType => &mut self.damage_type,
            JobField::OldSerial => &mut self.old_serial,
            JobField::NewSerial => &mut self.new_serial,
            JobField::LaborHours => &mut self.labor_hours,
        };
        // First occurrence wins, like a form lookup.
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    fn into_job(self, index: usize) -> AppResult<JobInput> {
        let text = |value: Option<String>, field: &str, max_chars: usize| {
            limit_text(
                value.as_deref(),
                &format!("job[{}][{}]", index, field),
                max_chars,
            )
        };

        Ok(JobInput {
            quantity: coerce_i32(
                self.quantity.as_deref(),
                &format!("job[{}][quantity]", index),
                1,
            )?,
            labor_hours: coerce_f64(
                self.labor_hours.as_deref(),
                &format!("job[{}][labor_hours]", index),
                0.0,
            )?,
            job_code: text(self.code, "code", CODE_LEN)?,
            description: text(self.description, "description", DESCRIPTION_LEN)?,
            part_number: text(self.part_number, "part_number", NAME_LEN)?,
            part_description: text(self.part_description, "part_description", DESCRIPTION_LEN)?,
            damage_type: text(self.damage_type, "damage_type", CODE_LEN)?,
            old_serial: text(self.old_serial, "old_serial", NAME_LEN)?,
            new_serial: text(self.new_serial, "new_serial", NAME_LEN)?,
        })
    }
}

/// Validate the raw fields and build the submission.
///
/// Container code and date are checked first; nothing here touches the
/// database.
pub fn assemble(fields: &FormFields) -> AppResult<Submission> {
    let container_number = validate_container_number(fields.get("containernr"))?;
    let report_date = parse_report_date(fields.get("datum"))?;

    let report = ReportInput {
        container_number,
        report_date,
        technician_name: required_text(fields, "naam", NAME_LEN)?,
        model: optional_text(fields, "model", NAME_LEN)?,
        serial_number: optional_text(fields, "serienr", NAME_LEN)?,
        warranty_id: optional_text(fields, "warranty_id", NAME_LEN)?,
        warranty_status: optional_text(fields, "garantie", NAME_LEN)?,
        setpoint: coerce_f64(fields.get("setpoint"), "setpoint", 0.0)?,
        vents: optional_text(fields, "vents", CODE_LEN)?,
        humidity: optional_text(fields, "hum", CODE_LEN)?,
        ambient_temp: coerce_f64(fields.get("ambient"), "ambient", 0.0)?,
        supply_temp_before: coerce_f64(fields.get("supply_voor"), "supply_voor", 0.0)?,
        supply_temp_after: coerce_f64(fields.get("supply_na"), "supply_na", 0.0)?,
        return_temp_before: coerce_f64(fields.get("return_voor"), "return_voor", 0.0)?,
        return_temp_after: coerce_f64(fields.get("return_na"), "return_na", 0.0)?,
        temp_in_range: optional_text(fields, "temp_in_range", CODE_LEN)?,
        problem_description: optional_text(fields, "probleem", usize::MAX)?,
        comments: optional_text(fields, "opmerkingen", usize::MAX)?,
    };

    let job_count = parse_job_count(fields.get("job_count"))?;
    let jobs = parse_jobs(fields, job_count)?;
    let alarms = parse_alarms(fields)?;

    Ok(Submission {
        report,
        jobs,
        alarms,
    })
}

/// Read jobs `0..job_count`. An index with no fields at all still yields a
/// job with default values; indexes at or beyond `job_count` are ignored.
fn parse_jobs(fields: &FormFields, job_count: usize) -> AppResult<Vec<JobInput>> {
    let mut raw: BTreeMap<usize, RawJob> = BTreeMap::new();

    for (key, value) in fields.iter() {
        let Some(caps) = JOB_FIELD.captures(key) else {
            continue;
        };
        let (Ok(index), Some(field)) = (caps[1].parse::<usize>(), JobField::parse(&caps[2]))
        else {
            debug!("Ignoring unrecognized job field '{}'", key);
            continue;
        };
        if index >= job_count {
            debug!(
                "Ignoring job field '{}' beyond job_count {}",
                key, job_count
            );
            continue;
        }
        raw.entry(index).or_default().set(field, value);
    }

    (0..job_count)
        .map(|index| raw.remove(&index).unwrap_or_default().into_job(index))
        .collect()
}

/// Trimmed alarm codes; blank entries are dropped.
fn parse_alarms(fields: &FormFields) -> AppResult<Vec<String>> {
    fields
        .get_all(ALARM_FIELD)
        .filter_map(|code| limit_text(Some(code), ALARM_FIELD, NAME_LEN).transpose())
        .collect()
}
