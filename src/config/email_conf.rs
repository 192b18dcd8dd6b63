use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmtpSecurity {
    /// Plain connection, for local relays and test servers
    None,
    StartTls,
    /// Implicit TLS, usually port 465
    Wrapper,
}

impl FromStr for SmtpSecurity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "plain" => Ok(SmtpSecurity::None),
            "starttls" => Ok(SmtpSecurity::StartTls),
            "tls" | "wrapper" | "ssl" => Ok(SmtpSecurity::Wrapper),
            other => Err(ConfigError::InvalidValue(format!("Unknown SMTP security mode: {}", other))),
        }
    }
}

/// SMTP settings for admin notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Empty when the relay accepts unauthenticated mail
    pub smtp_username: String,
    pub smtp_password: String,
    pub security: SmtpSecurity,
    pub from_email: String,
    pub from_name: String,
    /// Recipient of every submission notification
    pub admin_email: String,
    pub connection_timeout_secs: u64,
}

/// First set variable among `names`.
fn first_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| env::var(n).ok()).filter(|v| !v.is_empty())
}

impl EmailConfig {
    /// Load SMTP settings from the environment.
    ///
    /// EMAIL_USER / EMAIL_PASS are accepted in place of SMTP_USERNAME / SMTP_PASSWORD,
    /// and the sender address falls back to the username.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");
        let defaults = EmailConfig::default();

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| {
            warn!("SMTP_HOST not set, using default: {}", defaults.smtp_host);
            defaults.smtp_host.clone()
        });

        let security = match env::var("SMTP_SECURITY") {
            Ok(value) => value.parse::<SmtpSecurity>()?,
            Err(_) => defaults.security,
        };

        let default_port = match security {
            SmtpSecurity::Wrapper => 465,
            _ => 587,
        };
        let smtp_port = match env::var("SMTP_PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| {
                error!("Invalid SMTP_PORT value");
                ConfigError::InvalidValue("Invalid SMTP_PORT value".to_string())
            })?,
            Err(_) => default_port,
        };
        debug!("SMTP server: {}:{} ({:?})", smtp_host, smtp_port, security);

        let smtp_username = first_var(&["SMTP_USERNAME", "EMAIL_USER"]).unwrap_or_default();
        let smtp_password = first_var(&["SMTP_PASSWORD", "EMAIL_PASS"]).unwrap_or_default();
        if smtp_username.is_empty() {
            warn!("No SMTP credentials set, sending unauthenticated");
        }

        let from_email = first_var(&["SMTP_FROM_EMAIL"])
            .or_else(|| Some(smtp_username.clone()).filter(|u| u.contains('@')))
            .ok_or_else(|| {
                error!("Neither SMTP_FROM_EMAIL nor an address-like SMTP username is set");
                ConfigError::EnvVarNotFound("SMTP_FROM_EMAIL".to_string())
            })?;

        let from_name = env::var("SMTP_FROM_NAME").unwrap_or(defaults.from_name);

        let admin_email = env::var("ADMIN_EMAIL").map_err(|_| {
            error!("ADMIN_EMAIL environment variable not found");
            ConfigError::EnvVarNotFound("ADMIN_EMAIL".to_string())
        })?;
        debug!("Notifications go to {}", admin_email);

        let connection_timeout_secs = env::var("SMTP_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.connection_timeout_secs);

        let config = EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            security,
            from_email,
            from_name,
            admin_email,
            connection_timeout_secs,
        };
        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    /// Settings for a local catch-all SMTP server
    pub fn from_test_env() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            security: SmtpSecurity::None,
            from_email: "forms@example.com".to_string(),
            from_name: "NoteEase Test".to_string(),
            admin_email: "admin@example.com".to_string(),
            connection_timeout_secs: 5,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            error!("SMTP host is empty");
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }
        if self.smtp_port == 0 {
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }
        if self.smtp_username.is_empty() != self.smtp_password.is_empty() {
            error!("Only one of SMTP username and password is set");
            return Err(ConfigError::ValidationError(
                "SMTP username and password must be set together".to_string(),
            ));
        }
        for (name, address) in [("from", &self.from_email), ("admin", &self.admin_email)] {
            let well_formed = address
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
            if !well_formed {
                error!("Invalid {} email address: {}", name, address);
                return Err(ConfigError::ValidationError(format!("Invalid {} email address", name)));
            }
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Connection timeout cannot be 0".to_string()));
        }
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        !self.smtp_username.is_empty()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            security: SmtpSecurity::StartTls,
            from_email: "noreply@example.com".to_string(),
            from_name: "NoteEase".to_string(),
            admin_email: "admin@example.com".to_string(),
            connection_timeout_secs: 30,
        }
    }
}
