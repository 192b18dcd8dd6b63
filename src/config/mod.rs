pub mod app_conf;
pub mod cors_conf;
pub mod email_conf;
pub mod form_conf;
pub mod minio_conf;
pub mod mongo_conf;
pub mod notification_conf;
pub mod upload_conf;

pub use app_conf::AppConfig;
pub use cors_conf::CorsConfig;
pub use email_conf::EmailConfig;
pub use form_conf::FormConfig;
pub use minio_conf::MinioConfig;
pub use mongo_conf::MongoConfig;
pub use notification_conf::{NotificationChannel, NotificationConfig};
pub use upload_conf::{UploadBackend, UploadConfig};

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub(crate) fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            tracing::error!("{} environment variable not found", name);
            ConfigError::EnvVarNotFound(name.to_string())
        })
}

/// Parse `name`, falling back to `default` (with a warning) when it is unset.
pub(crate) fn var_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            tracing::error!("Invalid {} value: {}", name, raw);
            ConfigError::InvalidValue(format!("Invalid {} value", name))
        }),
        Err(_) => {
            tracing::warn!("{} not set, using default: {}", name, default);
            Ok(default)
        }
    }
}
