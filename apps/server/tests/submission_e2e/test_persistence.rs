//! E2E tests: what gets stored, and what never does.

use rems_lib::entity::{alarm, repair_job, repair_report};
use rems_lib::services::Notifier;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tempfile::TempDir;

use super::test_helpers::*;

/// job_count = N → exactly N job rows, all linked to the returned report.
#[actix_rt::test]
async fn test_job_count_creates_that_many_jobs() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let (status, body) = submit_fields(&app, &with_jobs(4)).await;
    assert_eq!(status, 200, "{:?}", body);
    let report_id = body["report_id"].as_i64().unwrap() as i32;

    let jobs = repair_job::Entity::find()
        .filter(repair_job::Column::ReportId.eq(report_id))
        .all(pool.connection())
        .await
        .unwrap();
    assert_eq!(jobs.len(), 4);
    assert_eq!(row_counts(&pool).await, (1, 4, 0));
}

/// A job index with no fields at all still becomes a default row.
#[actix_rt::test]
async fn test_empty_job_index_still_stored() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let mut fields = with_field(valid_fields(), "job_count", "3");
    fields.push(field("job[2][code]", "CHK-DOOR"));
    let (status, body) = submit_fields(&app, &fields).await;
    assert_eq!(status, 200);

    let (_, report) = get_report(&app, body["report_id"].as_i64().unwrap()).await;
    let jobs = report["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 3);
    assert!(jobs[0]["job_code"].is_null());
    assert_eq!(jobs[0]["quantity"], 1);
    assert_eq!(jobs[2]["job_code"], "CHK-DOOR");
}

/// Alarms ["", "  ", "E5"] → exactly one stored alarm "E5".
#[actix_rt::test]
async fn test_blank_alarms_discarded() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let mut fields = valid_fields();
    fields.push(field("alarm[]", ""));
    fields.push(field("alarm[]", "  "));
    fields.push(field("alarm[]", "E5"));
    let (status, body) = submit_fields(&app, &fields).await;
    assert_eq!(status, 200);

    let alarms = alarm::Entity::find().all(pool.connection()).await.unwrap();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].alarm_code, "E5");
    assert_eq!(alarms[0].report_id as i64, body["report_id"].as_i64().unwrap());
}

/// The returned report_id is the primary key of a row readable right away.
#[actix_rt::test]
async fn test_report_id_round_trip() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let mut fields = with_jobs(2);
    fields.push(field("alarm[]", "AL21"));
    let (status, body) = submit_fields(&app, &fields).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
    let report_id = body["report_id"].as_i64().unwrap();

    let row = repair_report::Entity::find_by_id(report_id as i32)
        .one(pool.connection())
        .await
        .unwrap()
        .expect("report row should exist");
    assert_eq!(row.container_number, "MSKU1234567");
    assert_eq!(row.technician_name, "Jan Janssen");
    assert_eq!(row.setpoint, -18.0);

    let (status, report) = get_report(&app, report_id).await;
    assert_eq!(status, 200);
    assert_eq!(report["id"], report_id);
    assert_eq!(report["report_date"], "2025-03-14");
    assert_eq!(report["jobs"][1]["job_code"], "JOB-1");
    assert_eq!(report["jobs"][1]["quantity"], 2);
    assert_eq!(report["alarms"][0], "AL21");
}

/// Unknown report → 404.
#[actix_rt::test]
async fn test_unknown_report_not_found() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let (status, body) = get_report(&app, 9999).await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}

/// A failure after the report insert rolls everything back.
#[actix_rt::test]
async fn test_failure_mid_transaction_leaves_no_rows() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    // The report and job inserts succeed; the alarm insert cannot.
    pool.connection()
        .execute_unprepared("DROP TABLE alarms")
        .await
        .unwrap();

    let mut fields = with_jobs(2);
    fields.push(field("alarm[]", "E5"));
    let (status, body) = submit_fields(&app, &fields).await;

    assert_eq!(status, 500);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(
        repair_report::Entity::find()
            .count(pool.connection())
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        repair_job::Entity::find()
            .count(pool.connection())
            .await
            .unwrap(),
        0
    );
}

/// Deleting a report removes its jobs and alarms.
#[actix_rt::test]
async fn test_report_delete_cascades() {
    let pool = create_test_pool().await;
    let uploads = TempDir::new().unwrap();
    let app = create_test_app(&pool, uploads.path(), Notifier::disabled(), TEST_MAX_UPLOAD_SIZE).await;

    let mut fields = with_jobs(3);
    fields.push(field("alarm[]", "E5"));
    fields.push(field("alarm[]", "AL21"));
    let (_, body) = submit_fields(&app, &fields).await;
    let report_id = body["report_id"].as_i64().unwrap() as i32;
    assert_eq!(row_counts(&pool).await, (1, 3, 2));

    repair_report::Entity::delete_by_id(report_id)
        .exec(pool.connection())
        .await
        .unwrap();

    assert_eq!(row_counts(&pool).await, (0, 0, 0));
}
