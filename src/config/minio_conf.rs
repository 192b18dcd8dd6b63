use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{required_var, var_or, ConfigError};

/// The bucket uploaded files land in, plus the public prefix admins follow to fetch them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    /// `host:port`, no scheme.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: String,
    /// Prepended to `bucket/object` in notification links.
    pub links_prefix: String,
    pub secure: bool,
}

impl MinioConfig {
    /// MINIO_ENDPOINT, MINIO_ACCESS_KEY and MINIO_SECRET_KEY are required.
    /// MINIO_BUCKET_NAME, MINIO_LINKS_PREFIX and MINIO_SECURE fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = MinioConfig::default();
        let config = MinioConfig {
            endpoint: required_var("MINIO_ENDPOINT")?,
            access_key: required_var("MINIO_ACCESS_KEY")?,
            secret_key: required_var("MINIO_SECRET_KEY")?,
            bucket_name: var_or("MINIO_BUCKET_NAME", defaults.bucket_name)?,
            links_prefix: var_or("MINIO_LINKS_PREFIX", defaults.links_prefix)?,
            secure: var_or("MINIO_SECURE", defaults.secure)?,
        };
        debug!(
            endpoint = %config.endpoint,
            bucket = %config.bucket_name,
            secure = config.secure,
            "MinIO settings read"
        );

        config.validate()?;
        info!("MinIO configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bucket_ok = (3..=63).contains(&self.bucket_name.len())
            && self
                .bucket_name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');

        let problem = if self.endpoint.is_empty() {
            Some("MinIO endpoint cannot be empty".to_string())
        } else if self.access_key.is_empty() || self.secret_key.is_empty() {
            Some("MinIO credentials cannot be empty".to_string())
        } else if !bucket_ok {
            Some(format!(
                "Bucket name '{}' must be 3-63 lowercase letters, digits, '-' or '.'",
                self.bucket_name
            ))
        } else {
            None
        };

        match problem {
            Some(message) => {
                error!("{}", message);
                Err(ConfigError::ValidationError(message))
            }
            None => Ok(()),
        }
    }

    pub fn get_endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.endpoint)
    }
}

impl Default for MinioConfig {
    fn default() -> Self {
        MinioConfig {
            endpoint: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: "noteease-uploads".to_string(),
            links_prefix: "http://127.0.0.1:9000".to_string(),
            secure: false,
        }
    }
}
