//! Turns an inbound request body into a [`SubmissionForm`].
//!
//! Accepts `multipart/form-data`, `application/x-www-form-urlencoded` and
//! `application/json`. Anything else is rejected with 415.

use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest};
use futures_util::StreamExt;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{FormFields, SubmissionForm, UploadedFile};

use super::assembler::ALARM_FIELD;

const MULTIPART: &str = "multipart/form-data";
const URLENCODED: &str = "application/x-www-form-urlencoded";
const JSON: &str = "application/json";

/// Read the whole submission, enforcing `max_size` over the body.
pub async fn read_submission(
    req: &HttpRequest,
    payload: web::Payload,
    max_size: usize,
) -> AppResult<SubmissionForm> {
    let content_type = req.content_type().to_ascii_lowercase();

    let form = match content_type.as_str() {
        MULTIPART => read_multipart(Multipart::new(req.headers(), payload), max_size).await?,
        URLENCODED => {
            let body = read_body(payload, max_size).await?;
            SubmissionForm {
                fields: parse_urlencoded(&body)?,
                files: Vec::new(),
            }
        }
        JSON => {
            let body = read_body(payload, max_size).await?;
            SubmissionForm {
                fields: parse_json(&body)?,
                files: Vec::new(),
            }
        }
        "" => {
            return Err(AppError::UnsupportedMediaType(
                "missing Content-Type header".to_string(),
            ));
        }
        other => return Err(AppError::UnsupportedMediaType(other.to_string())),
    };

    debug!(
        "Read submission body ({}): {} fields, {} files",
        content_type,
        form.fields.len(),
        form.files.len()
    );

    Ok(form)
}

/// Collect the raw body, failing once it grows past `max_size`.
async fn read_body(mut payload: web::Payload, max_size: usize) -> AppResult<Vec<u8>> {
    let mut body = Vec::new();

    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|e| AppError::Validation(format!("Failed to read body: {}", e)))?;
        if body.len() + chunk.len() > max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "request body exceeds {} bytes",
                max_size
            )));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Text parts become fields, parts with a file name become files. The size
/// limit applies to the sum of all parts.
async fn read_multipart(mut payload: Multipart, max_size: usize) -> AppResult<SubmissionForm> {
    let mut form = SubmissionForm::default();
    let mut total_size: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field = item?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::Validation("Missing content disposition".to_string()))?;
        let name = content_disposition.get_name().unwrap_or_default().to_string();
        let file_name = content_disposition.get_filename().map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            total_size += chunk.len();
            if total_size > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "submission exceeds {} bytes",
                    max_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        match file_name {
            // Browsers send an empty file name for an untouched file input.
            Some(file_name) if file_name.trim().is_empty() => continue,
            Some(file_name) => form.files.push(UploadedFile {
                field_name: name,
                file_name,
                content_type,
                data,
            }),
            None => {
                let value = String::from_utf8(data).map_err(|_| {
                    AppError::Validation(format!("Field '{}' is not valid UTF-8", name))
                })?;
                form.fields.push(name, value);
            }
        }
    }

    if !form.files.is_empty() {
        info!(
            "Received {} file(s), {} bytes in total",
            form.files.len(),
            total_size
        );
    }

    Ok(form)
}

/// Parse an `application/x-www-form-urlencoded` body, keeping repeated keys.
pub fn parse_urlencoded(body: &[u8]) -> AppResult<FormFields> {
    let raw = std::str::from_utf8(body)
        .map_err(|_| AppError::Validation("Form body is not valid UTF-8".to_string()))?;

    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| AppError::Validation(format!("Invalid form body: {}", e)))?;

    // Percent-escapes that are not UTF-8 decode to U+FFFD.
    let replaced = |s: &str| s.contains(char::REPLACEMENT_CHARACTER);
    if !replaced(raw) && pairs.iter().any(|(k, v)| replaced(k) || replaced(v)) {
        return Err(AppError::Validation(
            "Form body contains percent-encoded bytes that are not UTF-8".to_string(),
        ));
    }

    Ok(pairs.into_iter().collect())
}

/// Flatten a JSON object into the same field map a form post produces.
///
/// Arrays become repeated keys. `alarm` is an alias of `alarm[]`, and a
/// `job`/`jobs` array of objects expands to `job[i][field]` keys.
pub fn parse_json(body: &[u8]) -> AppResult<FormFields> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(object) = value else {
        return Err(AppError::Validation(
            "JSON body must be an object".to_string(),
        ));
    };

    let mut fields = FormFields::new();
    for (key, value) in &object {
        match (key.as_str(), value) {
            ("job" | "jobs", Value::Array(jobs)) => push_jobs(&mut fields, &object, jobs)?,
            ("alarm", _) => push_value(&mut fields, ALARM_FIELD, value)?,
            _ => push_value(&mut fields, key, value)?,
        }
    }

    Ok(fields)
}

fn push_jobs(fields: &mut FormFields, object: &Map<String, Value>, jobs: &[Value]) -> AppResult<()> {
    for (index, job) in jobs.iter().enumerate() {
        let Value::Object(job) = job else {
            return Err(AppError::Validation(format!(
                "Job entry {} must be an object",
                index
            )));
        };
        for (name, value) in job {
            push_value(fields, &format!("job[{}][{}]", index, name), value)?;
        }
    }

    // An explicit job_count still wins.
    if !object.contains_key("job_count") {
        fields.push("job_count", jobs.len().to_string());
    }

    Ok(())
}

fn push_value(fields: &mut FormFields, key: &str, value: &Value) -> AppResult<()> {
    match value {
        Value::Null => {}
        Value::String(s) => fields.push(key, s.as_str()),
        Value::Number(n) => fields.push(key, n.to_string()),
        Value::Bool(b) => fields.push(key, b.to_string()),
        Value::Array(items) => {
            for item in items {
                if matches!(item, Value::Array(_) | Value::Object(_)) {
                    return Err(AppError::Validation(format!(
                        "Field '{}' must contain only scalar values",
                        key
                    )));
                }
                push_value(fields, key, item)?;
            }
        }
        Value::Object(_) => {
            return Err(AppError::Validation(format!(
                "Field '{}' must not be an object",
                key
            )));
        }
    }

    Ok(())
}
