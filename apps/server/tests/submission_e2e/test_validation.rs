//! E2E tests: rejected submissions leave nothing behind.

use rems_lib::services::Notifier;
use tempfile::TempDir;

use super::mock_mail::recording_notifier;
use super::test_helpers::*;

/// Container codes that do not match four letters + seven digits → 400, no rows.
#[actix_rt::test]
async fn test_invalid_container_rejected_without_rows() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let (notifier, transport) = recording_notifier();
    let app = create_test_app(&pool, uploads.path(), notifier, TEST_MAX_UPLOAD_SIZE).await;

    for code in ["", "MSKU123456", "MSKU12345678", "1234MSKU567", "MSKU 234567", "MSKU123456X"] {
        let fields = with_field(valid_fields(), "containernr", code);
        let (status, body) = submit_fields(&app, &fields).await;

        assert_eq!(status, 400, "{:?} should be rejected: {:?}", code, body);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid container number format");
    }

    assert_eq!(row_counts(&pool).await, (0, 0, 0));
    assert!(transport.sent().is_empty());
}

/// Missing container field → 400.
#[actix_rt::test]
async fn test_missing_container_rejected() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let fields: Vec<_> = valid_fields()
        .into_iter()
        .filter(|(k, _)| k != "containernr")
        .collect();
    let (status, _) = submit_fields(&app, &fields).await;

    assert_eq!(status, 400);
    assert_eq!(row_counts(&pool).await, (0, 0, 0));
}

/// Dates not in YYYY-MM-DD → 400.
#[actix_rt::test]
async fn test_unparseable_date_rejected() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    for date in ["14-03-2025", "2025/03/14", "2025-13-01", "yesterday"] {
        let fields = with_field(valid_fields(), "datum", date);
        let (status, body) = submit_fields(&app, &fields).await;

        assert_eq!(status, 400, "{:?} should be rejected", date);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    assert_eq!(row_counts(&pool).await, (0, 0, 0));
}

/// A measurement that is present but not a number → 400, not a silent zero.
#[actix_rt::test]
async fn test_malformed_number_rejected() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let fields = with_field(valid_fields(), "setpoint", "minus eighteen");
    let (status, body) = submit_fields(&app, &fields).await;

    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("setpoint"));
    assert_eq!(row_counts(&pool).await, (0, 0, 0));
}

/// Absent measurements default to 0 and absent quantities to 1.
#[actix_rt::test]
async fn test_absent_numbers_take_defaults() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let fields = vec![
        field("containernr", "TCNU7654321"),
        field("datum", "2025-06-02"),
        field("naam", "Piet"),
        field("job_count", "1"),
    ];
    let (status, body) = submit_fields(&app, &fields).await;
    assert_eq!(status, 200, "{:?}", body);

    let (_, report) = get_report(&app, body["report_id"].as_i64().unwrap()).await;
    assert_eq!(report["setpoint"], 0.0);
    assert_eq!(report["return_temp_after"], 0.0);
    assert_eq!(report["jobs"][0]["quantity"], 1);
    assert_eq!(report["jobs"][0]["labor_hours"], 0.0);
}

/// Text longer than its column → 400 before the database sees it.
#[actix_rt::test]
async fn test_overlong_text_rejected() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let fields = with_field(valid_fields(), "naam", &"N".repeat(101));
    let (status, body) = submit_fields(&app, &fields).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("naam"));

    let mut fields = with_jobs(1);
    fields.push(field("job[0][damage_type]", &"D".repeat(51)));
    let (status, _) = submit_fields(&app, &fields).await;
    assert_eq!(status, 400);

    assert_eq!(row_counts(&pool).await, (0, 0, 0));
}
