use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Origins allowed to call the form endpoints.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Reads CORS_ALLOWED_ORIGINS as a comma separated list.
    pub fn from_env() -> Result<Self, ConfigError> {
        let allowed_origins = match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(list) => list
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            Err(_) => {
                warn!("CORS_ALLOWED_ORIGINS not set, using defaults");
                CorsConfig::default().allowed_origins
            }
        };
        debug!("CORS allowed origins: {:?}", allowed_origins);

        let config = CorsConfig { allowed_origins };
        config.validate()?;
        info!("CORS configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_origins.is_empty() {
            error!("No CORS origins configured");
            return Err(ConfigError::ValidationError("At least one CORS origin is required".to_string()));
        }
        for origin in &self.allowed_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                error!("Invalid CORS origin: {}", origin);
                return Err(ConfigError::InvalidValue(format!("Invalid CORS origin: {}", origin)));
            }
        }
        Ok(())
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allowed_origins: vec![
                "https://pradyumanmishra20.github.io".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}
