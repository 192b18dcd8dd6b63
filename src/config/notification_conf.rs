use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
    Email,
    /// Notifications are only logged.
    None,
}

impl FromStr for NotificationChannel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "smtp" => Ok(NotificationChannel::Email),
            "none" | "off" | "disabled" => Ok(NotificationChannel::None),
            other => Err(ConfigError::InvalidValue(format!("Unknown notification channel: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub channel: NotificationChannel,
    pub timeout_secs: u64,
}

impl NotificationConfig {
    /// - NOTIFICATION_CHANNEL: "email" or "none" (defaults to email)
    /// - NOTIFICATION_TIMEOUT: seconds allowed for one delivery (defaults to 15)
    pub fn from_env() -> Result<Self, ConfigError> {
        let channel = match env::var("NOTIFICATION_CHANNEL") {
            Ok(value) => value.parse()?,
            Err(_) => {
                warn!("NOTIFICATION_CHANNEL not set, defaulting to email");
                NotificationChannel::Email
            }
        };
        debug!("Notification channel: {:?}", channel);

        let timeout_secs = env::var("NOTIFICATION_TIMEOUT")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid NOTIFICATION_TIMEOUT value");
                ConfigError::InvalidValue("Invalid NOTIFICATION_TIMEOUT value".to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::ValidationError("NOTIFICATION_TIMEOUT must be greater than 0".to_string()));
        }
        debug!("Notification timeout: {} seconds", timeout_secs);

        Ok(NotificationConfig { channel, timeout_secs })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            channel: NotificationChannel::Email,
            timeout_secs: 15,
        }
    }
}
