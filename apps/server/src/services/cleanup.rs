//! Cleanup of attachment files in the upload directory.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use super::attachments::{Attachment, is_stored_name};

/// Files older than this are left over from an interrupted request.
pub const STALE_UPLOAD_AGE: Duration = Duration::from_secs(60 * 60);

/// Remove the files written for one submission.
///
/// Best-effort: failures are logged and never returned.
pub async fn remove_attachments(attachments: &[Attachment]) {
    let mut deleted_count = 0;
    let mut error_count = 0;

    for attachment in attachments {
        match tokio::fs::remove_file(&attachment.path).await {
            Ok(()) => deleted_count += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Attachment {} already removed", attachment.path.display());
            }
            Err(e) => {
                warn!(
                    "Failed to delete attachment {}: {}",
                    attachment.path.display(),
                    e
                );
                error_count += 1;
            }
        }
    }

    if deleted_count > 0 || error_count > 0 {
        debug!(
            "Attachment cleanup: {} deleted, {} errors",
            deleted_count, error_count
        );
    }
}

/// Remove a file left by a failed write. A missing file is fine.
pub async fn remove_partial_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial upload {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to delete partial upload {}: {}", path.display(), e),
    }
}

/// Delete stored attachments in `upload_dir` last modified more than
/// `max_age` ago. Files not named like a stored attachment are left alone.
///
/// Runs once at start-up. Returns the number of files removed.
pub async fn sweep_stale_uploads(upload_dir: &Path, max_age: Duration) -> usize {
    let mut entries = match tokio::fs::read_dir(upload_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "Cannot read upload directory {}: {}",
                upload_dir.display(),
                e
            );
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut deleted_count = 0;

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Error while scanning upload directory: {}", e);
                break;
            }
        };

        if !is_stored_name(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => deleted_count += 1,
            Err(e) => warn!("Failed to delete stale upload {}: {}", entry.path().display(), e),
        }
    }

    if deleted_count > 0 {
        info!(
            "Removed {} stale upload(s) from {}",
            deleted_count,
            upload_dir.display()
        );
    }

    deleted_count
}
