use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::model::UploadedFile;

#[derive(Debug, thiserror::Error)]
pub enum FileSinkError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Remove failed: {0}")]
    Remove(String),
}

/// Where an accepted upload ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    /// Generated name, unique per upload; recorded on the submission.
    pub name: String,
    pub size: usize,
}

/// Destination for uploaded files.
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn store(&self, prefix: &str, file: &UploadedFile) -> Result<StoredFile, FileSinkError>;

    async fn remove(&self, name: &str) -> Result<(), FileSinkError>;

    /// Link an operator can follow to fetch the file, if the backend exposes one.
    fn link(&self, name: &str) -> Option<String>;
}

/// `<prefix>/<unix-millis>-<uuid>.<ext>`; the client filename is never reused.
pub fn generate_object_name(prefix: &str, file: &UploadedFile) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let id = Uuid::new_v4().simple();
    match file.extension().filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric())) {
        Some(ext) => format!("{}/{}-{}.{}", prefix, millis, id, ext),
        None => format!("{}/{}-{}", prefix, millis, id),
    }
}

/// Writes uploads under a directory on local disk.
pub struct LocalFileSink {
    root: PathBuf,
}

impl LocalFileSink {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, FileSinkError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            error!("Failed to create upload directory {}: {}", root.display(), e);
            FileSinkError::Unavailable(format!("Cannot create {}: {}", root.display(), e))
        })?;
        info!("Local upload directory ready at {}", root.display());
        Ok(LocalFileSink { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl FileSink for LocalFileSink {
    #[instrument(skip(self, file), fields(filename = %file.filename, size = file.size))]
    async fn store(&self, prefix: &str, file: &UploadedFile) -> Result<StoredFile, FileSinkError> {
        let name = generate_object_name(prefix, file);
        let path = self.path_for(&name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FileSinkError::Unavailable(e.to_string()))?;
        }

        // create_new: an existing file is never overwritten.
        let mut out = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                error!("Failed to create {}: {}", path.display(), e);
                FileSinkError::Write(e.to_string())
            })?;
        out.write_all(&file.content).await.map_err(|e| FileSinkError::Write(e.to_string()))?;
        out.flush().await.map_err(|e| FileSinkError::Write(e.to_string()))?;

        debug!("Stored upload as {}", name);
        Ok(StoredFile { name, size: file.size })
    }

    #[instrument(skip(self))]
    async fn remove(&self, name: &str) -> Result<(), FileSinkError> {
        match tokio::fs::remove_file(self.path_for(name)).await {
            Ok(()) => {
                info!("Removed stored upload {}", name);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to remove stored upload {}: {}", name, e);
                Err(FileSinkError::Remove(e.to_string()))
            }
        }
    }

    fn link(&self, _name: &str) -> Option<String> {
        None
    }
}
