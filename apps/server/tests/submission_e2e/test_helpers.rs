//! Shared test helpers for submission E2E tests.

use std::path::Path;

use actix_web::http::header;
use actix_web::{App, dev::ServiceResponse, test};
use rems_lib::app::{self, AppState};
use rems_lib::config::DatabaseSettings;
use rems_lib::db::DbPool;
use rems_lib::entity::{alarm, repair_job, repair_report};
use rems_lib::services::Notifier;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;

/// Upload limit used unless a test needs a smaller one.
pub const TEST_MAX_UPLOAD_SIZE: usize = 1024 * 1024;

/// Fresh in-memory database with the schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn create_test_pool() -> DbPool {
    let pool = DbPool::new(&DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
    .expect("Failed to open in-memory database");

    pool.run_migrations()
        .await
        .expect("Failed to run migrations");

    pool
}

/// Create a test app wired the same way as the server binary.
pub async fn create_test_app(
    pool: &DbPool,
    upload_dir: &Path,
    notifier: Notifier,
    max_upload_size: usize,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let state = AppState::new(pool.clone(), upload_dir, notifier, max_upload_size);

    test::init_service(App::new().configure(|cfg| app::configure(cfg, &state))).await
}

/// Ordered form fields; names may repeat.
pub type Fields = Vec<(String, String)>;

pub fn field(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

/// Field values for a submission that passes validation.
pub fn valid_fields() -> Fields {
    vec![
        field("containernr", "MSKU1234567"),
        field("datum", "2025-03-14"),
        field("naam", "Jan Janssen"),
        field("model", "ML3"),
        field("serienr", "SN-778812"),
        field("garantie", "ja"),
        field("setpoint", "-18"),
        field("ambient", "31.5"),
        field("supply_voor", "4.2"),
        field("supply_na", "-17.9"),
        field("return_voor", "5.0"),
        field("return_na", "-16.4"),
        field("probleem", "Compressor does not start"),
    ]
}

/// Replace (or add) one field.
pub fn with_field(mut fields: Fields, name: &str, value: &str) -> Fields {
    fields.retain(|(key, _)| key != name);
    fields.push(field(name, value));
    fields
}

/// Valid fields plus `count` indexed jobs.
pub fn with_jobs(count: usize) -> Fields {
    let mut fields = with_field(valid_fields(), "job_count", &count.to_string());
    for index in 0..count {
        fields.push(field(
            &format!("job[{}][code]", index),
            &format!("JOB-{}", index),
        ));
        fields.push(field(
            &format!("job[{}][quantity]", index),
            &(index + 1).to_string(),
        ));
    }
    fields
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    boundary: &'static str,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----remsTestBoundary7MA4YWxkTrZu0gW",
            body: Vec::new(),
        }
    }

    pub fn fields<'a>(mut self, fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (name, value) in fields {
            self = self.text(name, value);
        }
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Content-Type header value and the finished body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// POST a multipart submission and return status and JSON body.
pub async fn submit_multipart<S>(app: &S, body: MultipartBody) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (content_type, payload) = body.finish();
    let req = test::TestRequest::post()
        .uri("/api/submit")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(payload)
        .to_request();

    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// POST multipart text fields only.
pub async fn submit_fields<S>(app: &S, fields: &[(String, String)]) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let body = MultipartBody::new().fields(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    submit_multipart(app, body).await
}

/// GET a stored report.
pub async fn get_report<S>(app: &S, report_id: i64) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get()
        .uri(&format!("/api/reports/{}", report_id))
        .to_request();

    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Row counts for (reports, jobs, alarms).
pub async fn row_counts(pool: &DbPool) -> (u64, u64, u64) {
    let conn = pool.connection();
    (
        repair_report::Entity::find().count(conn).await.unwrap(),
        repair_job::Entity::find().count(conn).await.unwrap(),
        alarm::Entity::find().count(conn).await.unwrap(),
    )
}

/// Number of entries left in a directory.
pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
