use async_trait::async_trait;
use tracing::info;

use crate::model::{FormKind, SubmissionRecord};

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to build notification: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Delivery timed out after {0} seconds")]
    Timeout(u64),
}

/// Channel-neutral admin alert for one stored submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: FormKind,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl Notification {
    /// Render the alert for `record`. `file_link` points at the stored upload, when there is one.
    pub fn for_submission(record: &SubmissionRecord, file_link: Option<&str>) -> Self {
        let kind = record.kind();
        let subject = match kind {
            FormKind::Contact => "New Contact Message - NoteEase",
            FormKind::WriterApplication => "New Writer Application - NoteEase",
            FormKind::GenericRequest => "New Generic Request - NoteEase",
        }
        .to_string();

        let mut lines = record.summary();
        if let Some(link) = file_link {
            lines.push(("File link", link.to_string()));
        }

        let text_body = lines
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n");

        let rows: String = lines
            .iter()
            .map(|(label, value)| {
                format!(
                    "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
                    label,
                    html_escape::encode_text(value).replace('\n', "<br>")
                )
            })
            .collect();
        let html_body = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{title}</title></head>
<body style="font-family: Arial, sans-serif; color: #333;">
    <h2>{title}</h2>
    <table cellpadding="6">{rows}</table>
    <p style="font-size: 12px; color: #6c757d;">Sent automatically by the NoteEase backend.</p>
</body>
</html>"#,
            title = html_escape::encode_text(&subject),
            rows = rows
        );

        Notification { kind, subject, text_body, html_body }
    }
}

/// Delivers admin alerts over some channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError>;

    fn channel(&self) -> &'static str;
}

/// Used when NOTIFICATION_CHANNEL=none: alerts are logged and dropped.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        info!(kind = %notification.kind, subject = %notification.subject, "Notifications disabled, skipping delivery");
        Ok(())
    }

    fn channel(&self) -> &'static str {
        "none"
    }
}
