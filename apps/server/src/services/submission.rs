//! One submission, from raw form to response.
//!
//! `Received -> Validated -> Persisted -> Notified -> Cleaned -> Responded`.
//! Anything that fails before the commit aborts the request. Nothing after
//! the commit can turn it into an error.

use std::path::Path;

use tracing::{info, warn};

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{SubmissionForm, SubmitReportResponse};

use super::assembler::assemble;
use super::attachments::AttachmentHandler;
use super::cleanup::remove_attachments;
use super::notifier::Notifier;

/// Runs the submission workflow against its collaborators.
pub struct SubmissionService {
    pool: DbPool,
    attachments: AttachmentHandler,
    notifier: Notifier,
}

impl SubmissionService {
    pub fn new(pool: DbPool, attachments: AttachmentHandler, notifier: Notifier) -> Self {
        Self {
            pool,
            attachments,
            notifier,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        self.attachments.upload_dir()
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    pub async fn submit(&self, form: SubmissionForm) -> AppResult<SubmitReportResponse> {
        let submission = assemble(&form.fields)?;

        let report_id = self.pool.persist_submission(&submission).await?;
        info!(
            report_id,
            container = %submission.report.container_number,
            jobs = submission.jobs.len(),
            alarms = submission.alarms.len(),
            "Repair report stored"
        );

        // The report is committed; attachment problems only reduce the email.
        let attachments = match self.attachments.store_all(&form.files).await {
            Ok(attachments) => attachments,
            Err(e) => {
                warn!(report_id, error = %e, "Attachments not stored, notifying without them");
                Vec::new()
            }
        };

        let notification = self
            .notifier
            .notify(report_id, &submission, &attachments)
            .await;

        remove_attachments(&attachments).await;

        Ok(SubmitReportResponse {
            status: "success".to_string(),
            message: "Report submitted successfully".to_string(),
            report_id,
            notification,
            attachments: attachments.len(),
        })
    }
}
