pub mod email;
pub mod error;
pub mod file_sink;
pub mod logger;
pub mod minio;
pub mod notifier;
