//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "REMS Repair Report Server",
        version = "0.1.0",
        description = "Intake service for refrigerated container repair reports"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::health::ready,
        api::reports::submit_report,
        api::reports::get_report,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::NotificationStatus,
            models::SubmitReportResponse,
            models::ReportDetailResponse,
            models::RepairJobResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Reports", description = "Repair report submission and lookup")
    )
)]
pub struct ApiDoc;
