use tracing::{debug, info};

use crate::config::form_conf::FormConfig;
use crate::config::upload_conf::UploadConfig;
use crate::model::{FieldKind, FieldSpec, FormKind};

const NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 254;
const LONG_TEXT_MAX: usize = 5000;

/// Field specs for every form kind, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct FormRegistry {
    contact: Vec<FieldSpec>,
    writer_application: Vec<FieldSpec>,
    generic_request: Vec<FieldSpec>,
}

impl FormRegistry {
    pub fn new(form: &FormConfig, upload: &UploadConfig) -> Self {
        info!("Building form field registry");
        let file_field = |key: &'static str, label: &'static str| {
            FieldSpec::new(key, label, FieldKind::FileUpload)
                .extensions(upload.allowed_extensions.clone())
                .max_file_bytes(upload.max_file_bytes)
        };

        let contact = vec![
            FieldSpec::new("name", "Name", FieldKind::PlainText).required().length(None, Some(NAME_MAX)),
            FieldSpec::new("email", "Email", FieldKind::Email)
                .required_if(form.contact_email_required)
                .length(None, Some(EMAIL_MAX)),
            FieldSpec::new("message", "Message", FieldKind::TextArea)
                .required()
                .length(None, Some(LONG_TEXT_MAX)),
        ];

        let writer_application = vec![
            FieldSpec::new("name", "Name", FieldKind::PlainText).required().length(None, Some(NAME_MAX)),
            FieldSpec::new("email", "Email", FieldKind::Email).length(None, Some(EMAIL_MAX)),
            FieldSpec::new("phone", "Phone", FieldKind::Phone).required(),
            FieldSpec::new("education", "Education", FieldKind::PlainText)
                .required()
                .aliases(&["qualification"])
                .length(Some(2), Some(200)),
            FieldSpec::new("motivation", "Motivation", FieldKind::TextArea)
                .required()
                .aliases(&["experience"])
                .length(None, Some(LONG_TEXT_MAX)),
            FieldSpec::new("sample_link", "Sample link", FieldKind::Url).length(None, Some(500)),
            file_field("writing_sample", "Writing sample")
                .required_if(form.writing_sample_required)
                .aliases(&["resume"]),
        ];

        let generic_request = vec![
            FieldSpec::new("name", "Name", FieldKind::PlainText).required().length(None, Some(NAME_MAX)),
            FieldSpec::new("phone", "Phone", FieldKind::Phone).required(),
            FieldSpec::new("email", "Email", FieldKind::Email).length(None, Some(EMAIL_MAX)),
            FieldSpec::new("address", "Address", FieldKind::PlainText)
                .required()
                .length(Some(5), Some(300)),
            FieldSpec::new("topic", "Topic", FieldKind::Select).length(None, Some(100)),
            FieldSpec::new("message", "Message", FieldKind::TextArea)
                .required()
                .aliases(&["instructions"])
                .length(None, Some(LONG_TEXT_MAX)),
            FieldSpec::new("pages", "Pages", FieldKind::Number)
                .whole_number()
                .range(Some(1.0), Some(1000.0)),
            FieldSpec::new("budget", "Budget", FieldKind::Number).range(Some(0.0), None),
            FieldSpec::new("deadline", "Deadline", FieldKind::Date).no_past_dates(),
            file_field("attachment", "Attachment"),
        ];

        debug!(
            contact = contact.len(),
            writer_application = writer_application.len(),
            generic_request = generic_request.len(),
            "Form field registry built"
        );
        Self { contact, writer_application, generic_request }
    }

    pub fn specs(&self, kind: FormKind) -> &[FieldSpec] {
        match kind {
            FormKind::Contact => &self.contact,
            FormKind::WriterApplication => &self.writer_application,
            FormKind::GenericRequest => &self.generic_request,
        }
    }

    /// Find the spec a payload key belongs to, following aliases.
    pub fn resolve(&self, kind: FormKind, key: &str) -> Option<&FieldSpec> {
        self.specs(kind).iter().find(|spec| spec.accepts_key(key))
    }

    pub fn required_keys(&self, kind: FormKind) -> impl Iterator<Item = &'static str> + '_ {
        self.specs(kind).iter().filter(|s| s.required).map(|s| s.key)
    }

    /// The upload field of `kind`, if the form accepts one.
    pub fn file_field(&self, kind: FormKind) -> Option<&FieldSpec> {
        self.specs(kind).iter().find(|s| s.kind == FieldKind::FileUpload)
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        FormRegistry::new(&FormConfig::default(), &UploadConfig::default())
    }
}
