//! Liveness and readiness probes.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::services::SubmissionService;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// What a submission depends on right now.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// "ready" or "not_ready"
    status: &'static str,
    /// "connected" or "unreachable"
    database: &'static str,
    /// "available" or "missing"
    upload_dir: &'static str,
    /// "enabled" or "disabled"; disabled mail does not block readiness
    mail: &'static str,
}

/// Returns 200 while the process is serving requests.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Returns 200 when a report could be stored: the database answers and the
/// upload directory exists.
#[utoipa::path(
    get,
    path = "/api/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Submissions can be accepted", body = ReadyResponse),
        (status = 503, description = "Database or upload directory unavailable", body = ReadyResponse)
    )
)]
#[get("/ready")]
pub async fn ready(
    pool: web::Data<DbPool>,
    submissions: web::Data<SubmissionService>,
) -> HttpResponse {
    let database_ok = ping(&pool).await;
    let upload_dir_ok = tokio::fs::metadata(submissions.upload_dir())
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    let body = ReadyResponse {
        status: if database_ok && upload_dir_ok {
            "ready"
        } else {
            "not_ready"
        },
        database: if database_ok { "connected" } else { "unreachable" },
        upload_dir: if upload_dir_ok { "available" } else { "missing" },
        mail: if submissions.notifications_enabled() {
            "enabled"
        } else {
            "disabled"
        },
    };

    if database_ok && upload_dir_ok {
        HttpResponse::Ok().json(body)
    } else {
        warn!(
            database = body.database,
            upload_dir = body.upload_dir,
            "Readiness check failed"
        );
        HttpResponse::ServiceUnavailable().json(body)
    }
}

async fn ping(pool: &DbPool) -> bool {
    let conn = pool.connection();
    let stmt = Statement::from_string(conn.get_database_backend(), "SELECT 1".to_owned());
    match conn.query_one_raw(stmt).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Database ping failed: {}", e);
            false
        }
    }
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
