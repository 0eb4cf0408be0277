//! Writes uploaded files to the upload directory for one mailing.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use futures_util::future::BoxFuture;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::UploadedFile;

use super::cleanup::{remove_attachments, remove_partial_file};

/// Extensions accepted, with the MIME type used in the email.
const ALLOWED_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
];

/// Longest sanitized name kept in the stored file name.
const MAX_NAME_LEN: usize = 100;

type WriteFn = for<'a> fn(&'a Path, &'a [u8]) -> BoxFuture<'a, io::Result<()>>;

fn write_file<'a>(path: &'a Path, data: &'a [u8]) -> BoxFuture<'a, io::Result<()>> {
    Box::pin(tokio::fs::write(path, data))
}

/// How a file is presented in the summary email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Photo taken before the repair
    Before,
    /// Photo taken after the repair
    After,
    Document,
}

impl AttachmentKind {
    /// Classify by the form field key. The key is split on anything that is
    /// not alphanumeric, so `fotos_voor[]` is "before" but `naam` is not
    /// "after".
    pub fn from_field_name(field_name: &str) -> Self {
        field_name
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .find_map(|token| match token {
                "voor" | "before" => Some(Self::Before),
                "na" | "after" => Some(Self::After),
                _ => None,
            })
            .unwrap_or(Self::Document)
    }
}

/// A file written for the current submission.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub path: PathBuf,
    /// Name on disk, unique per submission
    pub stored_name: String,
    /// Name as the client sent it
    pub original_name: String,
    pub kind: AttachmentKind,
    pub content_type: &'static str,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Stores uploaded files under a server-controlled directory.
#[derive(Debug, Clone)]
pub struct AttachmentHandler {
    upload_dir: PathBuf,
}

impl AttachmentHandler {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Write every acceptable file and return what was written.
    ///
    /// Files with an empty name or a disallowed extension are skipped. If a
    /// write fails, files already written for this call are removed before
    /// the error is returned.
    pub async fn store_all(&self, files: &[UploadedFile]) -> AppResult<Vec<Attachment>> {
        self.store_all_with(files, write_file).await
    }

    async fn store_all_with(
        &self,
        files: &[UploadedFile],
        write: WriteFn,
    ) -> AppResult<Vec<Attachment>> {
        let mut stored = Vec::with_capacity(files.len());

        for file in files {
            match self.store(file, write).await {
                Ok(Some(attachment)) => stored.push(attachment),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        "Storing attachments failed after {} file(s), removing them",
                        stored.len()
                    );
                    remove_attachments(&stored).await;
                    return Err(e);
                }
            }
        }

        if !stored.is_empty() {
            info!(
                "Stored {} attachment(s) in {}",
                stored.len(),
                self.upload_dir.display()
            );
        }

        Ok(stored)
    }

    async fn store(&self, file: &UploadedFile, write: WriteFn) -> AppResult<Option<Attachment>> {
        let original_name = file.file_name.trim();
        if original_name.is_empty() {
            return Ok(None);
        }

        let Some(content_type) = allowed_content_type(original_name) else {
            debug!("Skipping '{}': extension not allowed", original_name);
            return Ok(None);
        };

        let stored_name = unique_name(original_name);
        let path = self.upload_dir.join(&stored_name);

        if let Err(e) = write(&path, &file.data).await {
            // The writer may have created a truncated file before failing.
            remove_partial_file(&path).await;
            return Err(AppError::FileSystem(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            )));
        }

        Ok(Some(Attachment {
            path,
            stored_name,
            original_name: original_name.to_string(),
            kind: AttachmentKind::from_field_name(&file.field_name),
            content_type,
        }))
    }
}

/// MIME type for an allowed file name, `None` otherwise.
pub fn allowed_content_type(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();

    ALLOWED_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Prefix of every name produced by [`unique_name`].
static STORED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{8}_\d{6}_[0-9a-f]{8}_").expect("valid stored name regex")
});

/// Whether a file name looks like one this handler wrote.
pub fn is_stored_name(name: &str) -> bool {
    STORED_NAME.is_match(name)
}

/// `<YYYYmmdd_HHMMSS>_<8 hex>_<sanitized name>`
fn unique_name(original_name: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &token[..8],
        sanitize_file_name(original_name)
    )
}

/// Reduce a client file name to a safe basename.
pub fn sanitize_file_name(name: &str) -> String {
    // Only the last path component counts.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    let cleaned: String = cleaned.chars().take(MAX_NAME_LEN).collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
