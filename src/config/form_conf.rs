use std::env;
use tracing::{debug, warn};

/// Deployment switches for the form field sets.
#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    /// Whether the contact form must carry an email address.
    pub contact_email_required: bool,
    /// Whether writer applications must attach a writing sample.
    pub writing_sample_required: bool,
}

fn flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| {
            v.parse::<bool>()
                .map_err(|_| warn!("Invalid {} value, defaulting to false", name))
                .ok()
        })
        .unwrap_or(false)
}

impl FormConfig {
    /// - CONTACT_EMAIL_REQUIRED: "true" makes the contact email mandatory
    /// - WRITING_SAMPLE_REQUIRED: "true" makes the writer upload mandatory
    pub fn from_env() -> Self {
        let contact_email_required = flag("CONTACT_EMAIL_REQUIRED");
        let writing_sample_required = flag("WRITING_SAMPLE_REQUIRED");
        debug!(contact_email_required, writing_sample_required, "Form switches loaded");
        FormConfig { contact_email_required, writing_sample_required }
    }
}
