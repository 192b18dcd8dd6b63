use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_DIR: &str = "logs";

/// Holds the appender guards; dropping it flushes and stops the file writers.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    /// Console logging always; daily rolling plain and JSON files unless LOG_TO_FILES=false.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,noteease_backend=debug,tower_http=debug"));

        let to_files = std::env::var("LOG_TO_FILES")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let console = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(true)
            .with_filter(console_filter);

        if !to_files {
            tracing_subscriber::registry().with(console).try_init()?;
            return Ok(Logger { guards: Vec::new() });
        }

        std::fs::create_dir_all(LOG_DIR)?;
        let file_log_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_file_log_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        let (general, general_guard) = non_blocking(rolling::daily(LOG_DIR, "noteease-backend.log"));
        let (errors, error_guard) = non_blocking(rolling::daily(format!("{}/error", LOG_DIR), "noteease-backend-error.log"));
        let (json, json_guard) = non_blocking(rolling::daily(format!("{}/json", LOG_DIR), "noteease-backend.json"));

        tracing_subscriber::registry()
            .with(console)
            .with(
                fmt::layer()
                    .with_writer(general)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_file_log_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(json)
                    .with_current_span(true)
                    .with_filter(EnvFilter::new(&file_log_level)),
            )
            .try_init()?;

        Ok(Logger { guards: vec![general_guard, error_guard, json_guard] })
    }
}
