use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::model::{FieldKind, FieldValue, FieldValues, FormKind, SubmissionRecord};
use crate::repository::submission_repo::SubmissionRepository;
use crate::util::error::SubmissionError;
use crate::util::file_sink::{FileSink, StoredFile};
use crate::util::notifier::{Notification, NotificationError, Notifier};
use crate::validation::{validate_form, FormRegistry, FormValidation};

/// What an accepted submission produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub kind: FormKind,
    pub id: Option<String>,
    pub file_ref: Option<String>,
}

#[async_trait]
pub trait SubmissionService: Send + Sync {
    fn registry(&self) -> &FormRegistry;

    /// Validate, store the upload and persist, then hand the record to the notifier.
    /// Returns once the record is durable; delivery of the alert is not awaited.
    async fn handle_submission(
        &self,
        kind: FormKind,
        values: FieldValues,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

pub struct SubmissionServiceImpl {
    pub registry: Arc<FormRegistry>,
    pub repo: Arc<dyn SubmissionRepository>,
    pub sink: Arc<dyn FileSink>,
    pub notifier: Arc<dyn Notifier>,
    pub persist_timeout: Duration,
    pub notify_timeout: Duration,
}

impl SubmissionServiceImpl {
    pub fn new(
        registry: Arc<FormRegistry>,
        repo: Arc<dyn SubmissionRepository>,
        sink: Arc<dyn FileSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        SubmissionServiceImpl {
            registry,
            repo,
            sink,
            notifier,
            persist_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeouts(mut self, persist: Duration, notify: Duration) -> Self {
        self.persist_timeout = persist;
        self.notify_timeout = notify;
        self
    }

    fn check_required(&self, kind: FormKind, values: &FieldValues) -> Result<(), SubmissionError> {
        let missing: Vec<&str> = self
            .registry
            .required_keys(kind)
            .filter(|key| values.get(key).map_or(true, FieldValue::is_empty))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        info!(%kind, missing = ?missing, "Submission is missing required fields");
        Err(SubmissionError::InvalidPayload(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }

    /// Drop rejected optional uploads, then decide whether what is left is acceptable.
    fn validate(&self, kind: FormKind, values: &mut FieldValues) -> Result<(), SubmissionError> {
        let specs = self.registry.specs(kind);
        let first_pass = validate_form(specs, values);
        if first_pass.valid {
            return Ok(());
        }

        for result in first_pass.errors().filter(|r| r.discard_value) {
            let optional = specs.iter().any(|s| s.key == result.field_key && !s.required);
            if optional {
                info!(
                    field = %result.field_key,
                    reason = result.message.as_deref().unwrap_or_default(),
                    "Discarding rejected upload"
                );
                values.remove(&result.field_key);
            }
        }

        let validation: FormValidation = validate_form(specs, values);
        if validation.valid {
            return Ok(());
        }

        let upload_failure = validation.errors().find(|r| {
            specs
                .iter()
                .any(|s| s.key == r.field_key && s.kind == FieldKind::FileUpload)
        });
        if let Some(result) = upload_failure {
            let message = result.message.clone().unwrap_or_else(|| "Upload rejected".to_string());
            info!(field = %result.field_key, "Required upload rejected: {}", message);
            return Err(SubmissionError::Upload(message));
        }

        info!(%kind, invalid = validation.errors().count(), "Submission failed validation");
        Err(SubmissionError::Validation(validation))
    }

    async fn store_upload(&self, kind: FormKind, values: &FieldValues) -> Result<Option<StoredFile>, SubmissionError> {
        let Some(spec) = self.registry.file_field(kind) else {
            return Ok(None);
        };
        let Some(file) = values.file(spec.key) else {
            return Ok(None);
        };
        let stored = self.sink.store(kind.upload_prefix(), file).await.map_err(|e| {
            error!("Failed to store upload for {}: {}", kind, e);
            SubmissionError::from(e)
        })?;
        info!(name = %stored.name, size = stored.size, "Upload stored");
        Ok(Some(stored))
    }

    async fn discard_upload(&self, stored: Option<&StoredFile>) {
        if let Some(stored) = stored {
            if let Err(e) = self.sink.remove(&stored.name).await {
                warn!("Could not remove orphaned upload {}: {}", stored.name, e);
            }
        }
    }

    /// Deliver the admin alert on its own task; the caller does not wait for it.
    fn dispatch_notification(&self, record: &SubmissionRecord) {
        let link = record.file_ref().and_then(|name| self.sink.link(name));
        let notification = Notification::for_submission(record, link.as_deref());
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.notify_timeout;

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, notifier.notify(&notification)).await {
                Ok(result) => result,
                Err(_) => Err(NotificationError::Timeout(timeout.as_secs())),
            };
            match outcome {
                Ok(()) => info!(channel = notifier.channel(), kind = %notification.kind, "Admin notified"),
                Err(e) => warn!(
                    channel = notifier.channel(),
                    kind = %notification.kind,
                    "Notification failed, submission kept: {}",
                    e
                ),
            }
        });
    }
}

#[async_trait]
impl SubmissionService for SubmissionServiceImpl {
    fn registry(&self) -> &FormRegistry {
        &self.registry
    }

    #[instrument(skip(self, values), fields(kind = %kind, fields = values.len()))]
    async fn handle_submission(
        &self,
        kind: FormKind,
        mut values: FieldValues,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        info!("Handling {} submission", kind);

        self.check_required(kind, &values)?;
        self.validate(kind, &mut values)?;

        let stored = self.store_upload(kind, &values).await?;
        let file_ref = stored.as_ref().map(|s| s.name.clone());

        let record = match SubmissionRecord::from_values(kind, &values, file_ref.clone()) {
            Ok(record) => record,
            Err(e) => {
                error!("Validated values did not map onto a record: {}", e);
                self.discard_upload(stored.as_ref()).await;
                return Err(SubmissionError::Internal(e.to_string()));
            }
        };

        let inserted = match tokio::time::timeout(self.persist_timeout, self.repo.insert(record)).await {
            Ok(Ok(inserted)) => inserted,
            Ok(Err(e)) => {
                error!("Failed to persist {} submission: {}", kind, e);
                self.discard_upload(stored.as_ref()).await;
                return Err(SubmissionError::from(e));
            }
            Err(_) => {
                error!("Persisting {} submission timed out after {:?}", kind, self.persist_timeout);
                self.discard_upload(stored.as_ref()).await;
                return Err(SubmissionError::Persistence("insert timed out".to_string()));
            }
        };

        self.dispatch_notification(&inserted);
        let id = inserted.id().map(|id| id.to_hex());
        info!(id = ?id, "{} submission accepted", kind);

        Ok(SubmissionReceipt { kind, id, file_ref })
    }
}
