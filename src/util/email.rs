use crate::config::email_conf::{EmailConfig, SmtpSecurity};
use crate::config::ConfigError;
use crate::util::notifier::{Notification, NotificationError, Notifier};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

impl From<EmailError> for NotificationError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::SmtpError(msg) => NotificationError::Delivery(msg),
            other => NotificationError::Build(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

/// Sends submission alerts to the configured admin address.
pub struct SmtpEmailService {
    pub config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");
        config.validate()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        let tls = match config.security {
            SmtpSecurity::None => Tls::None,
            security => {
                let params = TlsParameters::new(config.smtp_host.clone())
                    .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;
                if security == SmtpSecurity::StartTls {
                    Tls::Required(params)
                } else {
                    Tls::Wrapper(params)
                }
            }
        };
        builder = builder.tls(tls);

        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        let transport = builder.build();
        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }

    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        let email = self.build_message(message)?;
        self.transport.send(email).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;
        info!("Email sent successfully");
        Ok(())
    }

    pub fn build_message(&self, message: EmailMessage) -> Result<Message, EmailError> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let builder = Message::builder().from(from).to(to).subject(&message.subject);
        let built = match message.html_body {
            Some(html) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(message.text_body))
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html)),
            ),
            None => builder.header(ContentType::TEXT_PLAIN).body(message.text_body),
        };
        built.map_err(|e| EmailError::MessageError(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl Notifier for SmtpEmailService {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        let message = EmailMessage {
            to: self.config.admin_email.clone(),
            subject: notification.subject.clone(),
            text_body: notification.text_body.clone(),
            html_body: Some(notification.html_body.clone()),
        };
        self.send_email(message).await.map_err(NotificationError::from)
    }

    fn channel(&self) -> &'static str {
        "email"
    }
}
