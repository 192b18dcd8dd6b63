use axum::Router;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{
    AppConfig, ConfigError, CorsConfig, EmailConfig, FormConfig, MinioConfig, MongoConfig,
    NotificationChannel, NotificationConfig, UploadBackend, UploadConfig,
};
use crate::repository::submission_repo::{MongoSubmissionRepository, SubmissionRepository};
use crate::router::app_router;
use crate::service::submission_service::SubmissionServiceImpl;
use crate::util::email::SmtpEmailService;
use crate::util::file_sink::{FileSink, LocalFileSink};
use crate::util::minio::MinioService;
use crate::util::notifier::{DisabledNotifier, Notifier};
use crate::validation::FormRegistry;

/// Startup failure; the process exits with this message.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dependency unavailable: {0}")]
    Dependency(String),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    /// Load configuration and connect every backing service. Any failure aborts startup.
    pub async fn new() -> Result<Self, StartupError> {
        let config = AppConfig::from_env();
        let mongo_config = MongoConfig::from_env()?;
        let upload_config = UploadConfig::from_env()?;
        let notification_config = NotificationConfig::from_env()?;
        let cors_config = CorsConfig::from_env()?;
        let form_config = FormConfig::from_env();

        let registry = Arc::new(FormRegistry::new(&form_config, &upload_config));

        let repo: Arc<dyn SubmissionRepository> = Arc::new(
            MongoSubmissionRepository::new(&mongo_config)
                .await
                .map_err(|e| StartupError::Dependency(e.to_string()))?,
        );

        let sink: Arc<dyn FileSink> = match upload_config.backend {
            UploadBackend::Local => Arc::new(
                LocalFileSink::new(upload_config.local_dir.clone())
                    .await
                    .map_err(|e| StartupError::Dependency(e.to_string()))?,
            ),
            UploadBackend::Minio => Arc::new(
                MinioService::new(MinioConfig::from_env()?)
                    .await
                    .map_err(|e| StartupError::Dependency(e.to_string()))?,
            ),
        };

        let notifier: Arc<dyn Notifier> = match notification_config.channel {
            NotificationChannel::Email => Arc::new(
                SmtpEmailService::new(EmailConfig::from_env()?)
                    .map_err(|e| StartupError::Dependency(e.to_string()))?,
            ),
            NotificationChannel::None => Arc::new(DisabledNotifier),
        };
        info!(
            upload_backend = ?upload_config.backend,
            notifier = notifier.channel(),
            "Backing services ready"
        );

        let service = SubmissionServiceImpl::new(registry, repo, sink, notifier)
            .with_timeouts(mongo_config.operation_timeout(), notification_config.timeout());

        let router = app_router(Arc::new(service), &cors_config, upload_config.body_limit());
        Ok(App { config, router })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until Ctrl-C or SIGTERM; in-flight requests are allowed to finish.
    pub async fn start(self) -> Result<(), StartupError> {
        let addr = self.config.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind {}: {}", addr, e);
            e
        })?;
        info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
