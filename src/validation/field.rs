use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::model::{FieldKind, FieldSpec, FieldValue, RawValue, UploadedFile};
use crate::validation::patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    MissingRequired,
    InvalidFormat,
    TooShort,
    TooLong,
    OutOfRange,
    DateInPast,
    DisallowedFileType,
    FileTooLarge,
}

/// Outcome of checking one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub field_key: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<FieldErrorCode>,
    /// The submitted value must be cleared (rejected uploads).
    #[serde(skip)]
    pub discard_value: bool,
}

impl ValidationResult {
    pub fn ok(field_key: &str) -> Self {
        Self {
            field_key: field_key.to_string(),
            valid: true,
            message: None,
            code: None,
            discard_value: false,
        }
    }

    fn failed(field_key: &str, failure: Failure) -> Self {
        Self {
            field_key: field_key.to_string(),
            valid: false,
            message: Some(failure.message),
            code: Some(failure.code),
            discard_value: failure.discard,
        }
    }
}

struct Failure {
    code: FieldErrorCode,
    message: String,
    discard: bool,
}

impl Failure {
    fn new(code: FieldErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), discard: false }
    }

    fn discard(mut self) -> Self {
        self.discard = true;
        self
    }
}

/// Check `value` against `spec`, dating relative to today in the local zone.
pub fn validate_field(spec: &FieldSpec, value: Option<&FieldValue>) -> ValidationResult {
    validate_field_on(spec, value, Local::now().date_naive())
}

/// Check `value` against `spec`; only the first failing rule is reported.
pub fn validate_field_on(spec: &FieldSpec, value: Option<&FieldValue>, today: NaiveDate) -> ValidationResult {
    let empty = value.map_or(true, FieldValue::is_empty);
    if empty {
        if spec.required {
            return ValidationResult::failed(
                spec.key,
                Failure::new(FieldErrorCode::MissingRequired, format!("{} is required", spec.label)),
            );
        }
        return ValidationResult::ok(spec.key);
    }

    let outcome = match value.map(|v| &v.raw) {
        Some(RawValue::Text(text)) => check_text(spec, text.trim(), today),
        Some(RawValue::File(file)) => check_file(spec, file),
        None => Ok(()),
    };

    match outcome {
        Ok(()) => ValidationResult::ok(spec.key),
        Err(failure) => ValidationResult::failed(spec.key, failure),
    }
}

fn check_text(spec: &FieldSpec, value: &str, today: NaiveDate) -> Result<(), Failure> {
    let constraints = &spec.constraints;
    match spec.kind {
        FieldKind::PlainText => {
            if let Some(pattern) = &constraints.pattern {
                if !pattern.is_match(value) {
                    return Err(Failure::new(
                        FieldErrorCode::InvalidFormat,
                        format!("{} has an invalid format", spec.label),
                    ));
                }
            }
            if patterns::denotes_name(spec.key) && !patterns::NAME.is_match(value) {
                return Err(Failure::new(
                    FieldErrorCode::InvalidFormat,
                    "Please enter a valid name (2-50 letters, spaces, apostrophes or hyphens)",
                ));
            }
        }
        FieldKind::Email => {
            if !patterns::EMAIL.is_match(value) {
                return Err(Failure::new(FieldErrorCode::InvalidFormat, "Please enter a valid email address"));
            }
        }
        FieldKind::Phone => {
            if !patterns::PHONE.is_match(value) {
                return Err(Failure::new(
                    FieldErrorCode::InvalidFormat,
                    "Please enter a valid 10-digit mobile number",
                ));
            }
        }
        FieldKind::Password => {
            if !patterns::is_strong_password(value) {
                return Err(Failure::new(
                    FieldErrorCode::InvalidFormat,
                    format!(
                        "Password must be at least {} characters and include an uppercase letter, a lowercase letter, a number and one of {}",
                        patterns::PASSWORD_MIN_LENGTH,
                        patterns::PASSWORD_SYMBOLS
                    ),
                ));
            }
        }
        FieldKind::Pincode => {
            if !patterns::PINCODE.is_match(value) {
                return Err(Failure::new(FieldErrorCode::InvalidFormat, "Please enter a valid 6-digit pincode"));
            }
        }
        FieldKind::Url => {
            if !patterns::URL.is_match(value) {
                return Err(Failure::new(
                    FieldErrorCode::InvalidFormat,
                    "Please enter a valid URL starting with http:// or https://",
                ));
            }
        }
        FieldKind::Username => {
            if !patterns::USERNAME.is_match(value) {
                return Err(Failure::new(
                    FieldErrorCode::InvalidFormat,
                    "Username must be 4-20 characters using letters, numbers or underscores",
                ));
            }
        }
        FieldKind::Number => check_number(spec, value)?,
        FieldKind::Date => {
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                Failure::new(FieldErrorCode::InvalidFormat, "Please enter a valid date")
            })?;
            if !constraints.allow_past_date && date < today {
                return Err(Failure::new(
                    FieldErrorCode::DateInPast,
                    format!("{} cannot be in the past", spec.label),
                ));
            }
        }
        FieldKind::FileUpload => {
            return Err(Failure::new(
                FieldErrorCode::InvalidFormat,
                format!("{} must be an uploaded file", spec.label),
            )
            .discard());
        }
        // Presence is all a selection needs; it was checked above.
        FieldKind::Select => {}
        FieldKind::TextArea => {
            if spec.required && value.chars().count() < patterns::TEXTAREA_MIN_LENGTH {
                return Err(Failure::new(
                    FieldErrorCode::TooShort,
                    format!("{} must be at least {} characters", spec.label, patterns::TEXTAREA_MIN_LENGTH),
                ));
            }
        }
    }

    check_length(spec, value)
}

fn check_number(spec: &FieldSpec, value: &str) -> Result<(), Failure> {
    let constraints = &spec.constraints;
    let number = value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Failure::new(FieldErrorCode::InvalidFormat, format!("{} must be a number", spec.label)))?;

    if constraints.whole_number && number.fract() != 0.0 {
        return Err(Failure::new(
            FieldErrorCode::InvalidFormat,
            format!("{} must be a whole number", spec.label),
        ));
    }
    if let Some(min) = constraints.min_value {
        if number < min {
            return Err(Failure::new(
                FieldErrorCode::OutOfRange,
                format!("{} must be at least {}", spec.label, min),
            ));
        }
    }
    if let Some(max) = constraints.max_value {
        if number > max {
            return Err(Failure::new(
                FieldErrorCode::OutOfRange,
                format!("{} must be at most {}", spec.label, max),
            ));
        }
    }
    Ok(())
}

fn check_length(spec: &FieldSpec, value: &str) -> Result<(), Failure> {
    let len = value.chars().count();
    if let Some(min) = spec.constraints.min_length {
        if len < min {
            return Err(Failure::new(
                FieldErrorCode::TooShort,
                format!("{} must be at least {} characters", spec.label, min),
            ));
        }
    }
    if let Some(max) = spec.constraints.max_length {
        if len > max {
            return Err(Failure::new(
                FieldErrorCode::TooLong,
                format!("{} must not exceed {} characters", spec.label, max),
            ));
        }
    }
    Ok(())
}

fn check_file(spec: &FieldSpec, file: &UploadedFile) -> Result<(), Failure> {
    if spec.kind != FieldKind::FileUpload {
        return Err(Failure::new(
            FieldErrorCode::InvalidFormat,
            format!("{} does not accept file uploads", spec.label),
        )
        .discard());
    }

    let allowed: Vec<&str> = match &spec.constraints.allowed_extensions {
        Some(list) => list.iter().map(String::as_str).collect(),
        None => patterns::DEFAULT_FILE_EXTENSIONS.to_vec(),
    };
    let extension_ok = file
        .extension()
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)));
    if !extension_ok {
        let listed = allowed
            .iter()
            .map(|e| e.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Failure::new(
            FieldErrorCode::DisallowedFileType,
            format!("Only {} files are allowed", listed),
        )
        .discard());
    }

    if let Some(max) = spec.constraints.max_file_bytes {
        if file.size > max {
            return Err(Failure::new(
                FieldErrorCode::FileTooLarge,
                format!("File must be smaller than {}", human_size(max)),
            )
            .discard());
        }
    }
    Ok(())
}

fn human_size(bytes: usize) -> String {
    const MB: usize = 1024 * 1024;
    const KB: usize = 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}
