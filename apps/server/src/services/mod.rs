//! Business logic services.

pub mod assembler;
pub mod attachments;
pub mod cleanup;
pub mod intake;
pub mod notifier;
pub mod submission;
pub mod validator;

pub use attachments::{Attachment, AttachmentHandler, AttachmentKind};
pub use cleanup::{STALE_UPLOAD_AGE, remove_attachments, sweep_stale_uploads};
pub use intake::read_submission;
pub use notifier::{MailTransport, NotificationError, Notifier, SmtpMailer};
pub use submission::SubmissionService;
