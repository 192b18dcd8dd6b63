use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::field_value::FieldValues;
use crate::model::form::FormKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: Option<String>,
    pub message: String,
    pub created_at: Option<bson::DateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterApplication {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub education: String,
    pub motivation: String,
    pub sample_link: Option<String>,
    /// Generated storage name of the uploaded writing sample.
    pub writing_sample: Option<String>,
    pub created_at: Option<bson::DateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub topic: Option<String>,
    pub message: String,
    pub pages: Option<u32>,
    pub budget: Option<f64>,
    pub deadline: Option<String>,
    /// Generated storage name of the uploaded attachment.
    pub attachment: Option<String>,
    pub created_at: Option<bson::DateTime>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid number in field: {0}")]
    InvalidNumber(&'static str),
}

/// A validated submission ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionRecord {
    Contact(ContactMessage),
    WriterApplication(WriterApplication),
    GenericRequest(GenericRequest),
}

fn required(values: &FieldValues, key: &'static str) -> Result<String, RecordError> {
    values
        .text(key)
        .map(str::to_string)
        .ok_or(RecordError::MissingField(key))
}

fn optional(values: &FieldValues, key: &str) -> Option<String> {
    values.text(key).map(str::to_string)
}

fn optional_number(values: &FieldValues, key: &'static str) -> Result<Option<f64>, RecordError> {
    values
        .text(key)
        .map(|s| {
            s.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or(RecordError::InvalidNumber(key))
        })
        .transpose()
}

impl SubmissionRecord {
    /// Build the record for `kind` from already validated values.
    ///
    /// `file_ref` is the generated storage name of the upload, if one was stored.
    pub fn from_values(
        kind: FormKind,
        values: &FieldValues,
        file_ref: Option<String>,
    ) -> Result<Self, RecordError> {
        let record = match kind {
            FormKind::Contact => SubmissionRecord::Contact(ContactMessage {
                id: None,
                name: required(values, "name")?,
                email: optional(values, "email"),
                message: required(values, "message")?,
                created_at: None,
            }),
            FormKind::WriterApplication => SubmissionRecord::WriterApplication(WriterApplication {
                id: None,
                name: required(values, "name")?,
                email: optional(values, "email"),
                phone: required(values, "phone")?,
                education: required(values, "education")?,
                motivation: required(values, "motivation")?,
                sample_link: optional(values, "sample_link"),
                writing_sample: file_ref,
                created_at: None,
            }),
            FormKind::GenericRequest => {
                let pages = optional_number(values, "pages")?;
                if pages.is_some_and(|p| p.fract() != 0.0 || p < 0.0 || p > u32::MAX as f64) {
                    return Err(RecordError::InvalidNumber("pages"));
                }
                SubmissionRecord::GenericRequest(GenericRequest {
                    id: None,
                    name: required(values, "name")?,
                    phone: required(values, "phone")?,
                    email: optional(values, "email"),
                    address: required(values, "address")?,
                    topic: optional(values, "topic"),
                    message: required(values, "message")?,
                    pages: pages.map(|p| p as u32),
                    budget: optional_number(values, "budget")?,
                    deadline: optional(values, "deadline"),
                    attachment: file_ref,
                    created_at: None,
                })
            }
        };
        Ok(record)
    }

    pub fn kind(&self) -> FormKind {
        match self {
            SubmissionRecord::Contact(_) => FormKind::Contact,
            SubmissionRecord::WriterApplication(_) => FormKind::WriterApplication,
            SubmissionRecord::GenericRequest(_) => FormKind::GenericRequest,
        }
    }

    pub fn id(&self) -> Option<ObjectId> {
        match self {
            SubmissionRecord::Contact(r) => r.id,
            SubmissionRecord::WriterApplication(r) => r.id,
            SubmissionRecord::GenericRequest(r) => r.id,
        }
    }

    pub fn file_ref(&self) -> Option<&str> {
        match self {
            SubmissionRecord::Contact(_) => None,
            SubmissionRecord::WriterApplication(r) => r.writing_sample.as_deref(),
            SubmissionRecord::GenericRequest(r) => r.attachment.as_deref(),
        }
    }

    /// Stamp identity and creation time before insert.
    pub fn assign_identity(&mut self, id: ObjectId, created_at: DateTime<Utc>) {
        let created_at = bson::DateTime::from_chrono(created_at);
        match self {
            SubmissionRecord::Contact(r) => {
                r.id = Some(id);
                r.created_at = Some(created_at);
            }
            SubmissionRecord::WriterApplication(r) => {
                r.id = Some(id);
                r.created_at = Some(created_at);
            }
            SubmissionRecord::GenericRequest(r) => {
                r.id = Some(id);
                r.created_at = Some(created_at);
            }
        }
    }

    /// Label/value pairs describing the record, in display order.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        fn or_na(v: &Option<String>) -> String {
            v.clone().unwrap_or_else(|| "N/A".to_string())
        }
        match self {
            SubmissionRecord::Contact(r) => vec![
                ("Name", r.name.clone()),
                ("Email", or_na(&r.email)),
                ("Message", r.message.clone()),
            ],
            SubmissionRecord::WriterApplication(r) => vec![
                ("Name", r.name.clone()),
                ("Email", or_na(&r.email)),
                ("Phone", r.phone.clone()),
                ("Education", r.education.clone()),
                ("Motivation", r.motivation.clone()),
                ("Sample link", or_na(&r.sample_link)),
                ("Writing sample", or_na(&r.writing_sample)),
            ],
            SubmissionRecord::GenericRequest(r) => vec![
                ("Name", r.name.clone()),
                ("Phone", r.phone.clone()),
                ("Email", or_na(&r.email)),
                ("Address", r.address.clone()),
                ("Topic", or_na(&r.topic)),
                ("Message", r.message.clone()),
                ("Pages", r.pages.map(|p| p.to_string()).unwrap_or_else(|| "N/A".to_string())),
                ("Budget", r.budget.map(|b| b.to_string()).unwrap_or_else(|| "N/A".to_string())),
                ("Deadline", or_na(&r.deadline)),
                ("Attachment", or_na(&r.attachment)),
            ],
        }
    }
}
