//! E2E tests: the email is best effort and never decides the response.

use rems_lib::services::Notifier;
use tempfile::TempDir;

use super::mock_mail::{failing_notifier, recording_notifier};
use super::test_helpers::*;

/// A failing relay still yields success with a stored report.
#[actix_rt::test]
async fn test_mail_failure_still_succeeds() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), failing_notifier(), TEST_MAX_UPLOAD_SIZE).await;

    let (status, body) = submit_fields(&app, &with_jobs(1)).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Report submitted successfully");
    assert_eq!(body["notification"], "failed");

    let (status, report) = get_report(&app, body["report_id"].as_i64().unwrap()).await;
    assert_eq!(status, 200);
    assert_eq!(report["container_number"], "MSKU1234567");
}

#[actix_rt::test]
async fn test_summary_email_sent() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let (notifier, transport) = recording_notifier();
    let app = create_test_app(&pool, uploads.path(), notifier, TEST_MAX_UPLOAD_SIZE).await;

    let mut fields = with_jobs(2);
    fields.push(field("alarm[]", "AL21"));
    let (status, body) = submit_fields(&app, &fields).await;

    assert_eq!(status, 200);
    assert_eq!(body["notification"], "sent");
    assert_eq!(body["attachments"], 0);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert!(message.contains("Subject: Herstelmelding MSKU1234567 - 14-03-2025"));
    assert!(message.contains("To: workshop@example.com"));
    assert!(message.contains("Cc: lead@example.com"));
    assert!(message.contains("Content-Type: text/html"));
}

/// No mail configuration → nothing sent, still success.
#[actix_rt::test]
async fn test_disabled_notifier_skips() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let (status, body) = submit_fields(&app, &valid_fields()).await;

    assert_eq!(status, 200);
    assert_eq!(body["notification"], "skipped");
    assert_eq!(row_counts(&pool).await, (1, 0, 0));
}

/// Nothing is sent for a rejected submission.
#[actix_rt::test]
async fn test_no_mail_for_rejected_submission() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let (notifier, transport) = recording_notifier();
    let app = create_test_app(&pool, uploads.path(), notifier, TEST_MAX_UPLOAD_SIZE).await;

    let fields = with_field(valid_fields(), "datum", "not-a-date");
    let (status, _) = submit_fields(&app, &fields).await;

    assert_eq!(status, 400);
    assert!(transport.sent().is_empty());
}
