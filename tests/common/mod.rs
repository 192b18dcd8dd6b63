#![allow(dead_code)]

use async_trait::async_trait;
use bson::oid::ObjectId;
use bytes::Bytes;
use noteease_backend::config::{CorsConfig, UploadConfig};
use noteease_backend::model::{FieldValues, FormKind, SubmissionRecord, UploadedFile};
use noteease_backend::repository::{RepositoryError, RepositoryResult, SubmissionRepository};
use noteease_backend::router::app_router;
use noteease_backend::service::submission_service::SubmissionServiceImpl;
use noteease_backend::util::file_sink::{generate_object_name, FileSink, FileSinkError, StoredFile};
use noteease_backend::util::notifier::{Notification, NotificationError, Notifier};
use noteease_backend::validation::FormRegistry;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct MemoryRepository {
    pub records: Mutex<Vec<SubmissionRecord>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl MemoryRepository {
    pub fn failing() -> Self {
        MemoryRepository { fail: true, ..Default::default() }
    }

    pub fn slow(delay: Duration) -> Self {
        MemoryRepository { delay: Some(delay), ..Default::default() }
    }

    pub fn stored(&self, kind: FormKind) -> Vec<SubmissionRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.kind() == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SubmissionRepository for MemoryRepository {
    async fn insert(&self, record: SubmissionRecord) -> RepositoryResult<SubmissionRecord> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(RepositoryError::connection("store is down"));
        }
        let mut record = record;
        record.assign_identity(ObjectId::new(), chrono::Utc::now());
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn count(&self, kind: FormKind) -> RepositoryResult<u64> {
        Ok(self.stored(kind).len() as u64)
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub stored: Mutex<Vec<(String, Bytes)>>,
    pub removed: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn names(&self) -> Vec<String> {
        self.stored.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn store(&self, prefix: &str, file: &UploadedFile) -> Result<StoredFile, FileSinkError> {
        let name = generate_object_name(prefix, file);
        self.stored.lock().unwrap().push((name.clone(), file.content.clone()));
        Ok(StoredFile { name, size: file.size })
    }

    async fn remove(&self, name: &str) -> Result<(), FileSinkError> {
        self.removed.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn link(&self, name: &str) -> Option<String> {
        Some(format!("http://files.test/{}", name))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub attempts: Mutex<Vec<Notification>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        RecordingNotifier { fail: true, ..Default::default() }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Delivery runs on a spawned task; poll until `expected` attempts were seen or give up.
    pub async fn wait_for_attempts(&self, expected: usize) -> usize {
        for _ in 0..200 {
            if self.attempt_count() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.attempt_count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.attempts.lock().unwrap().push(notification.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(NotificationError::Delivery("smtp relay refused".to_string()));
        }
        Ok(())
    }

    fn channel(&self) -> &'static str {
        "recording"
    }
}

pub struct Harness {
    pub repo: Arc<MemoryRepository>,
    pub sink: Arc<MemorySink>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: Arc<SubmissionServiceImpl>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(MemoryRepository::default(), RecordingNotifier::default())
    }

    pub fn with(repo: MemoryRepository, notifier: RecordingNotifier) -> Self {
        Self::build(
            FormRegistry::default(),
            repo,
            notifier,
            Duration::from_secs(2),
            Duration::from_millis(200),
        )
    }

    pub fn build(
        registry: FormRegistry,
        repo: MemoryRepository,
        notifier: RecordingNotifier,
        persist_timeout: Duration,
        notify_timeout: Duration,
    ) -> Self {
        let repo = Arc::new(repo);
        let sink = Arc::new(MemorySink::default());
        let notifier = Arc::new(notifier);
        let service = SubmissionServiceImpl::new(
            Arc::new(registry),
            repo.clone(),
            sink.clone(),
            notifier.clone(),
        )
        .with_timeouts(persist_timeout, notify_timeout);
        Harness { repo, sink, notifier, service: Arc::new(service) }
    }

    pub fn router(&self) -> axum::Router {
        app_router(
            self.service.clone(),
            &CorsConfig::default(),
            UploadConfig::default().body_limit(),
        )
    }
}

pub fn contact_values() -> FieldValues {
    FieldValues::new()
        .with_text("name", "Jane Doe")
        .with_text("message", "Hello there, this is a test.")
}

pub fn request_values() -> FieldValues {
    FieldValues::new()
        .with_text("name", "Ravi Kumar")
        .with_text("phone", "9876543210")
        .with_text("address", "12 MG Road, Pune")
        .with_text("message", "Need a ten page report on renewable energy.")
}

pub fn writer_values() -> FieldValues {
    FieldValues::new()
        .with_text("name", "Asha Verma")
        .with_text("phone", "8123456789")
        .with_text("education", "MA English Literature")
        .with_text("motivation", "I have written for college magazines for three years.")
}

pub fn file(name: &str, content: &'static [u8]) -> UploadedFile {
    UploadedFile::new(name, "application/octet-stream", Bytes::from_static(content))
}
