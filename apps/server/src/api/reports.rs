//! Repair report API endpoints.

use actix_web::{HttpRequest, HttpResponse, get, post, web};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ReportDetailResponse, SubmitReportResponse};
use crate::services::{SubmissionService, read_submission};

/// Upload limit in bytes applied while reading a submission body.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

/// Submit a repair report.
///
/// Accepts `multipart/form-data` (with optional photo/document files),
/// `application/x-www-form-urlencoded` or `application/json`.
#[utoipa::path(
    post,
    path = "/api/submit",
    tag = "Reports",
    responses(
        (status = 200, description = "Report stored", body = SubmitReportResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 413, description = "Body exceeds the upload limit", body = crate::error::ErrorResponse),
        (status = 415, description = "Unsupported content type", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal error", body = crate::error::ErrorResponse),
    )
)]
#[post("/submit")]
pub async fn submit_report(
    req: HttpRequest,
    payload: web::Payload,
    service: web::Data<SubmissionService>,
    limit: web::Data<UploadLimit>,
) -> AppResult<HttpResponse> {
    let form = read_submission(&req, payload, limit.0).await?;
    let response = service.submit(form).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Get a stored report with its jobs and alarms.
#[utoipa::path(
    get,
    path = "/api/reports/{report_id}",
    tag = "Reports",
    params(
        ("report_id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report details", body = ReportDetailResponse),
        (status = 404, description = "Report not found", body = crate::error::ErrorResponse),
    )
)]
#[get("/reports/{report_id}")]
pub async fn get_report(pool: web::Data<DbPool>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let report_id = path.into_inner();

    let (report, jobs, alarms) = pool
        .get_report_detail(report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;

    Ok(HttpResponse::Ok().json(ReportDetailResponse::new(report, jobs, alarms)))
}

/// Configure report routes.
pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_report).service(get_report);
}
