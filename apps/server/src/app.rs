//! Shared application state and route wiring.

use std::path::PathBuf;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{self, ApiDoc, UploadLimit};
use crate::db::DbPool;
use crate::services::{AttachmentHandler, Notifier, SubmissionService};

/// Handles shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pool: web::Data<DbPool>,
    submissions: web::Data<SubmissionService>,
    upload_limit: UploadLimit,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        upload_dir: impl Into<PathBuf>,
        notifier: Notifier,
        max_upload_size: usize,
    ) -> Self {
        let submissions =
            SubmissionService::new(pool.clone(), AttachmentHandler::new(upload_dir), notifier);

        Self {
            pool: web::Data::new(pool),
            submissions: web::Data::new(submissions),
            upload_limit: UploadLimit(max_upload_size),
        }
    }
}

/// Register state and the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.pool.clone())
        .app_data(state.submissions.clone())
        .app_data(web::Data::new(state.upload_limit))
        .app_data(web::PayloadConfig::new(state.upload_limit.0))
        .service(
            web::scope("/api")
                .configure(api::configure_health_routes)
                .configure(api::configure_report_routes),
        );
}

/// Swagger UI at `/swagger-ui/`, document at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi())
}
