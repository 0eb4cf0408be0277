//! Summary email for a stored report.
//!
//! Dispatch is best-effort. Every failure is reported as
//! [`NotificationStatus::Failed`] and logged; nothing here can fail the
//! submission itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailPart, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use minijinja::Environment;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{MailSettings, SmtpTls};
use crate::models::{JobInput, NotificationStatus, ReportInput, Submission};

use super::attachments::{Attachment, AttachmentKind};

const TEMPLATE_NAME: &str = "report_email.html";
const TEMPLATE: &str = include_str!("../../templates/report_email.html");

/// Errors while composing or sending the summary email.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Invalid mail address '{0}'")]
    Address(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail dispatch timed out after {0:?}")]
    Timeout(Duration),
}

/// Something that can deliver a fully built message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), NotificationError>;
}

/// SMTP relay transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the relay client. No connection is made until the first send.
    pub fn from_settings(settings: &MailSettings) -> Result<Self, NotificationError> {
        let host = settings
            .smtp_host
            .as_deref()
            .ok_or_else(|| NotificationError::Transport("SMTP host not configured".to_string()))?;

        let builder = match settings.tls {
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| NotificationError::Transport(e.to_string()))?,
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| NotificationError::Transport(e.to_string()))?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        let mut builder = builder
            .port(settings.smtp_port)
            .timeout(Some(settings.timeout));

        if let (Some(user), Some(pass)) = (&settings.smtp_user, &settings.smtp_pass) {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                pass.expose_secret().to_string(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<(), NotificationError> {
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| NotificationError::Transport(e.to_string()))
    }
}

struct Mailer {
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    timeout: Duration,
    templates: Environment<'static>,
}

/// Composes and sends report summaries.
pub struct Notifier {
    mailer: Option<Mailer>,
}

impl Notifier {
    /// A notifier that never sends; every call reports `skipped`.
    pub fn disabled() -> Self {
        Self { mailer: None }
    }

    pub fn new(
        transport: Arc<dyn MailTransport>,
        from: &str,
        to: &[String],
        cc: &[String],
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let mut templates = Environment::new();
        templates.add_template(TEMPLATE_NAME, TEMPLATE)?;

        Ok(Self {
            mailer: Some(Mailer {
                transport,
                from: parse_mailbox(from)?,
                to: to.iter().map(|a| parse_mailbox(a)).collect::<Result<_, _>>()?,
                cc: cc.iter().map(|a| parse_mailbox(a)).collect::<Result<_, _>>()?,
                timeout,
                templates,
            }),
        })
    }

    /// SMTP notifier when mail is configured, disabled otherwise.
    pub fn from_settings(settings: &MailSettings) -> Result<Self, NotificationError> {
        if !settings.is_enabled() {
            info!("Mail not configured; report notifications are disabled");
            return Ok(Self::disabled());
        }

        let from = settings
            .email_from
            .as_deref()
            .ok_or_else(|| NotificationError::Address("EMAIL_FROM is not set".to_string()))?;
        let transport = Arc::new(SmtpMailer::from_settings(settings)?);

        Self::new(
            transport,
            from,
            &settings.email_to,
            &settings.email_cc,
            settings.timeout,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Send the summary for a committed report. Never returns an error.
    pub async fn notify(
        &self,
        report_id: i32,
        submission: &Submission,
        attachments: &[Attachment],
    ) -> NotificationStatus {
        let Some(mailer) = &self.mailer else {
            return NotificationStatus::Skipped;
        };

        match mailer.send(report_id, submission, attachments).await {
            Ok(()) => {
                info!(
                    report_id,
                    recipients = mailer.to.len() + mailer.cc.len(),
                    attachments = attachments.len(),
                    "Report notification sent"
                );
                NotificationStatus::Sent
            }
            Err(e) => {
                error!(report_id, error = %e, "Report notification failed");
                NotificationStatus::Failed
            }
        }
    }
}

impl Mailer {
    async fn send(
        &self,
        report_id: i32,
        submission: &Submission,
        attachments: &[Attachment],
    ) -> Result<(), NotificationError> {
        let message = self.compose(report_id, submission, attachments).await?;

        tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| NotificationError::Timeout(self.timeout))?
    }

    async fn compose(
        &self,
        report_id: i32,
        submission: &Submission,
        attachments: &[Attachment],
    ) -> Result<Message, NotificationError> {
        // An unreadable file costs only its own part of the message.
        let mut readable = Vec::with_capacity(attachments.len());
        let mut contents = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            match tokio::fs::read(&attachment.path).await {
                Ok(content) => {
                    readable.push(attachment.clone());
                    contents.push(content);
                }
                Err(e) => warn!(
                    report_id,
                    path = %attachment.path.display(),
                    error = %e,
                    "Attachment unreadable, sending without it"
                ),
            }
        }

        let html = render_body(&self.templates, report_id, submission, &readable)?;

        let mut related = MultiPart::related().singlepart(SinglePart::html(html));
        let mut documents = Vec::new();

        for (index, (attachment, content)) in readable.iter().zip(contents).enumerate() {
            let content_type = ContentType::parse(attachment.content_type)
                .map_err(|e| NotificationError::Message(e.to_string()))?;

            if attachment.is_image() {
                related = related
                    .singlepart(MailPart::new_inline(content_id(index)).body(content, content_type));
            } else {
                documents.push(
                    MailPart::new(attachment.original_name.clone()).body(content, content_type),
                );
            }
        }

        let mut body = MultiPart::mixed().multipart(related);
        for document in documents {
            body = body.singlepart(document);
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject(&submission.report));
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        for cc in &self.cc {
            builder = builder.cc(cc.clone());
        }

        builder
            .multipart(body)
            .map_err(|e| NotificationError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse()
        .map_err(|_| NotificationError::Address(address.to_string()))
}

fn content_id(index: usize) -> String {
    format!("attachment{}", index)
}

/// `Herstelmelding <container> - <dd-mm-YYYY>`
pub fn subject(report: &ReportInput) -> String {
    format!(
        "Herstelmelding {} - {}",
        report.container_number,
        report.report_date.format("%d-%m-%Y")
    )
}

#[derive(Serialize)]
struct InlineImage<'a> {
    cid: String,
    name: &'a str,
    label: &'static str,
}

#[derive(Serialize)]
struct EmailContext<'a> {
    report_id: i32,
    report: &'a ReportInput,
    report_date: String,
    jobs: &'a [JobInput],
    alarms: &'a [String],
    before_count: usize,
    after_count: usize,
    images: Vec<InlineImage<'a>>,
    documents: Vec<&'a str>,
}

fn render_body(
    templates: &Environment<'static>,
    report_id: i32,
    submission: &Submission,
    attachments: &[Attachment],
) -> Result<String, NotificationError> {
    let count = |kind: AttachmentKind| {
        attachments
            .iter()
            .filter(|a| a.is_image() && a.kind == kind)
            .count()
    };

    let images = attachments
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_image())
        .map(|(index, a)| InlineImage {
            cid: content_id(index),
            name: &a.original_name,
            label: match a.kind {
                AttachmentKind::Before => "Before",
                AttachmentKind::After => "After",
                AttachmentKind::Document => "Photo",
            },
        })
        .collect();

    let documents = attachments
        .iter()
        .filter(|a| !a.is_image())
        .map(|a| a.original_name.as_str())
        .collect();

    let context = EmailContext {
        report_id,
        report: &submission.report,
        report_date: submission.report.report_date.format("%d-%m-%Y").to_string(),
        jobs: &submission.jobs,
        alarms: &submission.alarms,
        before_count: count(AttachmentKind::Before),
        after_count: count(AttachmentKind::After),
        images,
        documents,
    };

    Ok(templates.get_template(TEMPLATE_NAME)?.render(&context)?)
}
