use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::{required_var, var_or, ConfigError};

/// Where submissions are stored and how long the service may wait on the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub pool_size: u32,
    /// Bounds connecting and server selection, including the startup ping.
    pub connection_timeout_secs: u64,
    /// Bounds a single submission insert.
    pub operation_timeout_secs: u64,
}

impl MongoConfig {
    /// - MONGO_URI (required)
    /// - MONGO_DATABASE, default `noteease`
    /// - MONGO_USERNAME / MONGO_PASSWORD, both or neither
    /// - MONGO_POOL_SIZE (10), MONGO_CONNECTION_TIMEOUT (5s), MONGO_OPERATION_TIMEOUT (10s)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = MongoConfig::default();
        let config = MongoConfig {
            uri: required_var("MONGO_URI")?,
            database: var_or("MONGO_DATABASE", defaults.database)?,
            username: env::var("MONGO_USERNAME").ok(),
            password: env::var("MONGO_PASSWORD").ok(),
            pool_size: var_or("MONGO_POOL_SIZE", defaults.pool_size)?,
            connection_timeout_secs: var_or("MONGO_CONNECTION_TIMEOUT", defaults.connection_timeout_secs)?,
            operation_timeout_secs: var_or("MONGO_OPERATION_TIMEOUT", defaults.operation_timeout_secs)?,
        };
        debug!(
            database = %config.database,
            authenticated = config.username.is_some(),
            pool_size = config.pool_size,
            "MongoDB settings read"
        );

        config.validate()?;
        info!("MongoDB configuration loaded");
        Ok(config)
    }

    /// A local server and a throwaway database.
    pub fn from_test_env() -> Self {
        MongoConfig {
            database: "noteease_test".to_string(),
            connection_timeout_secs: 2,
            operation_timeout_secs: 2,
            ..MongoConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let problem = if self.uri.is_empty() {
            Some("MongoDB URI cannot be empty")
        } else if self.database.is_empty() {
            Some("MongoDB database cannot be empty")
        } else if self.pool_size == 0 {
            Some("MongoDB pool size must be greater than 0")
        } else if self.connection_timeout_secs == 0 || self.operation_timeout_secs == 0 {
            Some("MongoDB timeouts must be greater than 0")
        } else {
            match (&self.username, &self.password) {
                (Some(u), Some(p)) if u.is_empty() || p.is_empty() => {
                    Some("MongoDB username and password cannot be empty")
                }
                (Some(_), None) | (None, Some(_)) => Some("MongoDB username and password must be set together"),
                _ => None,
            }
        };

        match problem {
            Some(message) => {
                error!("{}", message);
                Err(ConfigError::ValidationError(message.to_string()))
            }
            None => Ok(()),
        }
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "noteease".to_string(),
            username: None,
            password: None,
            pool_size: 10,
            connection_timeout_secs: 5,
            operation_timeout_secs: 10,
        }
    }
}
