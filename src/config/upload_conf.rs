use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

const DEFAULT_MAX_FILE_BYTES: usize = 2 * 1024 * 1024;

/// Where uploaded files are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadBackend {
    Local,
    Minio,
}

impl FromStr for UploadBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(UploadBackend::Local),
            "minio" => Ok(UploadBackend::Minio),
            other => Err(ConfigError::InvalidValue(format!("Unknown upload backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub backend: UploadBackend,
    /// Directory used by the local backend
    pub local_dir: PathBuf,
    pub max_file_bytes: usize,
    /// Lower-case extensions without the dot
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    /// Load upload configuration from environment variables
    ///
    /// - UPLOAD_BACKEND: "local" or "minio" (defaults to local)
    /// - UPLOAD_DIR: directory for the local backend (defaults to "uploads")
    /// - UPLOAD_MAX_BYTES: per-file size limit (defaults to 2 MB)
    /// - UPLOAD_ALLOWED_EXTENSIONS: comma separated list (defaults to pdf,doc,docx,txt)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading upload configuration from environment variables");
        let defaults = UploadConfig::default();

        let backend = match env::var("UPLOAD_BACKEND") {
            Ok(value) => value.parse::<UploadBackend>().map_err(|e| {
                error!("Invalid UPLOAD_BACKEND value: {}", value);
                e
            })?,
            Err(_) => {
                warn!("UPLOAD_BACKEND not set, defaulting to local");
                defaults.backend
            }
        };
        debug!("Upload backend: {:?}", backend);

        let local_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                debug!("UPLOAD_DIR not set, using default: uploads");
                defaults.local_dir.clone()
            });
        debug!("Upload directory: {}", local_dir.display());

        let max_file_bytes = match env::var("UPLOAD_MAX_BYTES") {
            Ok(value) => value.parse::<usize>().map_err(|_| {
                error!("Invalid UPLOAD_MAX_BYTES value");
                ConfigError::InvalidValue("Invalid UPLOAD_MAX_BYTES value".to_string())
            })?,
            Err(_) => {
                warn!("UPLOAD_MAX_BYTES not set, using default: {}", DEFAULT_MAX_FILE_BYTES);
                defaults.max_file_bytes
            }
        };
        debug!("Upload size limit: {} bytes", max_file_bytes);

        let allowed_extensions = env::var("UPLOAD_ALLOWED_EXTENSIONS")
            .map(|list| parse_extensions(&list))
            .unwrap_or_else(|_| defaults.allowed_extensions.clone());
        debug!("Allowed upload extensions: {:?}", allowed_extensions);

        let config = UploadConfig {
            backend,
            local_dir,
            max_file_bytes,
            allowed_extensions,
        };
        config.validate()?;
        info!("Upload configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_bytes == 0 {
            error!("Upload size limit is 0");
            return Err(ConfigError::ValidationError("UPLOAD_MAX_BYTES must be greater than 0".to_string()));
        }
        if self.allowed_extensions.is_empty() {
            error!("No upload extensions allowed");
            return Err(ConfigError::ValidationError("At least one upload extension must be allowed".to_string()));
        }
        if self.backend == UploadBackend::Local && self.local_dir.as_os_str().is_empty() {
            error!("Upload directory is empty");
            return Err(ConfigError::ValidationError("UPLOAD_DIR cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Overall request body limit: room for a rejected oversized file plus the text fields.
    pub fn body_limit(&self) -> usize {
        self.max_file_bytes.saturating_mul(2).saturating_add(256 * 1024)
    }
}

fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            backend: UploadBackend::Local,
            local_dir: PathBuf::from("uploads"),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            allowed_extensions: ["pdf", "doc", "docx", "txt"].iter().map(|e| e.to_string()).collect(),
        }
    }
}
