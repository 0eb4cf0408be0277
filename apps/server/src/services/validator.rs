//! Field-level validation and numeric coercion.
//!
//! Absent or blank numeric fields take a default. A value that is present
//! but not a number is rejected, so a typo never turns silently into 0.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::models::FormFields;

/// Four ASCII letters (owner code + category) followed by seven digits.
static CONTAINER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{4}[0-9]{7}$").expect("valid container regex"));

/// Date format accepted for `datum`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound on `job_count`.
pub const MAX_JOBS: usize = 100;

/// Character limits of the varchar columns the text fields land in.
pub const CODE_LEN: usize = 50;
pub const NAME_LEN: usize = 100;
pub const DESCRIPTION_LEN: usize = 255;

/// Check the container code invariant.
pub fn validate_container_number(raw: Option<&str>) -> AppResult<String> {
    match raw {
        Some(code) if CONTAINER_NUMBER.is_match(code) => Ok(code.to_string()),
        _ => Err(AppError::Validation(
            "Invalid container number format".to_string(),
        )),
    }
}

/// Parse the report date (`YYYY-MM-DD`).
pub fn parse_report_date(raw: Option<&str>) -> AppResult<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Missing required field: datum".to_string()))?;

    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        AppError::Validation(format!(
            "Invalid date '{}': expected format YYYY-MM-DD",
            raw
        ))
    })
}

/// Trimmed text value, `None` when absent or blank.
pub fn optional_text(fields: &FormFields, name: &str, max_chars: usize) -> AppResult<Option<String>> {
    limit_text(fields.get(name), name, max_chars)
}

/// Required text value.
pub fn required_text(fields: &FormFields, name: &str, max_chars: usize) -> AppResult<String> {
    optional_text(fields, name, max_chars)?
        .ok_or_else(|| AppError::Validation(format!("Missing required field: {}", name)))
}

/// Trim `raw`, map blank to `None` and reject values over `max_chars`.
pub fn limit_text(raw: Option<&str>, name: &str, max_chars: usize) -> AppResult<Option<String>> {
    let Some(value) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "Field '{}' must be at most {} characters",
            name, max_chars
        )));
    }

    Ok(Some(value.to_string()))
}

/// Coerce a measurement to `f64`, defaulting when absent or blank.
pub fn coerce_f64(raw: Option<&str>, name: &str, default: f64) -> AppResult<f64> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                AppError::Validation(format!("Field '{}' must be a number, got '{}'", name, value))
            }),
    }
}

/// Coerce a whole number to `i32`, defaulting when absent or blank.
pub fn coerce_i32(raw: Option<&str>, name: &str, default: i32) -> AppResult<i32> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => value.parse::<i32>().map_err(|_| {
            AppError::Validation(format!(
                "Field '{}' must be a whole number, got '{}'",
                name, value
            ))
        }),
    }
}

/// Number of indexed job entries announced by the client.
pub fn parse_job_count(raw: Option<&str>) -> AppResult<usize> {
    let count = coerce_i32(raw, "job_count", 0)?;

    if count < 0 {
        return Err(AppError::Validation(
            "Field 'job_count' must not be negative".to_string(),
        ));
    }

    let count = count as usize;
    if count > MAX_JOBS {
        return Err(AppError::Validation(format!(
            "Field 'job_count' must be at most {}",
            MAX_JOBS
        )));
    }

    Ok(count)
}
