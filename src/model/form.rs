use serde::{Deserialize, Serialize};
use std::fmt;

/// The three forms served by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Contact,
    WriterApplication,
    GenericRequest,
}

impl FormKind {
    pub const ALL: [FormKind; 3] = [
        FormKind::Contact,
        FormKind::WriterApplication,
        FormKind::GenericRequest,
    ];

    /// Collection the records of this kind are stored in.
    pub fn collection_name(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact_messages",
            FormKind::WriterApplication => "writer_applications",
            FormKind::GenericRequest => "generic_requests",
        }
    }

    /// Prefix used for files uploaded with this kind of submission.
    pub fn upload_prefix(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::WriterApplication => "writer",
            FormKind::GenericRequest => "request",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            FormKind::Contact => "Message sent successfully! We will get back to you soon.",
            FormKind::WriterApplication => "Writer application submitted successfully",
            FormKind::GenericRequest => "Request submitted successfully",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormKind::Contact => "Contact",
            FormKind::WriterApplication => "WriterApplication",
            FormKind::GenericRequest => "GenericRequest",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    PlainText,
    Email,
    Phone,
    Password,
    Pincode,
    Url,
    Username,
    Number,
    Date,
    FileUpload,
    Select,
    TextArea,
}

impl FieldKind {
    /// Whether the raw value of this kind is text (and therefore trimmed).
    pub fn is_text(&self) -> bool {
        !matches!(self, FieldKind::FileUpload)
    }
}

/// Kind-specific parameters attached to a field.
#[derive(Debug, Clone, Default)]
pub struct FieldConstraints {
    pub pattern: Option<regex::Regex>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// Numbers must have no fractional part.
    pub whole_number: bool,
    pub allowed_extensions: Option<Vec<String>>,
    pub max_file_bytes: Option<usize>,
    /// Dates before today are rejected unless this is set.
    pub allow_past_date: bool,
}

/// Static descriptor of one field of a form.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Alternate payload keys folded onto `key` when decoding.
    pub aliases: &'static [&'static str],
    pub constraints: FieldConstraints,
}

impl FieldSpec {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            aliases: &[],
            constraints: FieldConstraints {
                allow_past_date: true,
                ..FieldConstraints::default()
            },
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_if(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn pattern(mut self, pattern: regex::Regex) -> Self {
        self.constraints.pattern = Some(pattern);
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.constraints.min_length = min;
        self.constraints.max_length = max;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.constraints.min_value = min;
        self.constraints.max_value = max;
        self
    }

    pub fn whole_number(mut self) -> Self {
        self.constraints.whole_number = true;
        self
    }

    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.constraints.allowed_extensions = Some(extensions);
        self
    }

    pub fn max_file_bytes(mut self, max: usize) -> Self {
        self.constraints.max_file_bytes = Some(max);
        self
    }

    pub fn no_past_dates(mut self) -> Self {
        self.constraints.allow_past_date = false;
        self
    }

    /// True when `key` is this field's key or one of its aliases.
    pub fn accepts_key(&self, key: &str) -> bool {
        self.key == key || self.aliases.contains(&key)
    }
}
