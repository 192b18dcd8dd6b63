use axum::{http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;

use crate::repository::repository_error::RepositoryError;
use crate::util::file_sink::FileSinkError;
use crate::validation::{FieldErrorCode, FormValidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandlerErrorKind {
    Validation,
    BadRequest,
    PayloadTooLarge,
    UnsupportedMediaType,
    Internal,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::BadRequest => "BadRequest",
            HandlerErrorKind::PayloadTooLarge => "PayloadTooLarge",
            HandlerErrorKind::UnsupportedMediaType => "UnsupportedMediaType",
            HandlerErrorKind::Internal => "Internal",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<FieldErrorCode>,
}

/// Error response: `{"success": false, "message": ..., "errors": [...]}`.
#[derive(Debug, Serialize)]
pub struct HandlerError {
    #[serde(skip)]
    pub error: HandlerErrorKind,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldErrorBody>>,
}

impl HandlerError {
    pub fn new(error: HandlerErrorKind, message: impl Into<String>) -> Self {
        HandlerError { error, success: false, message: message.into(), errors: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn internal() -> Self {
        Self::new(HandlerErrorKind::Internal, "Server error. Please try again later.")
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self.error {
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            HandlerErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, axum::Json(self)).into_response()
    }
}

/// Why a submission was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Validation failed")]
    Validation(FormValidation),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Upload rejected: {0}")]
    Upload(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for SubmissionError {
    fn from(err: RepositoryError) -> Self {
        SubmissionError::Persistence(err.to_string())
    }
}

impl From<FileSinkError> for SubmissionError {
    fn from(err: FileSinkError) -> Self {
        SubmissionError::Internal(err.to_string())
    }
}

impl From<SubmissionError> for HandlerError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(validation) => {
                let errors: Vec<FieldErrorBody> = validation
                    .errors()
                    .map(|r| FieldErrorBody {
                        field: r.field_key.clone(),
                        message: r.message.clone().unwrap_or_default(),
                        code: r.code,
                    })
                    .collect();
                let message = errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Validation failed".to_string());
                HandlerError {
                    errors: Some(errors),
                    ..HandlerError::new(HandlerErrorKind::Validation, message)
                }
            }
            SubmissionError::InvalidPayload(msg) | SubmissionError::Upload(msg) => HandlerError::bad_request(msg),
            // Store details stay in the logs.
            SubmissionError::Persistence(_) | SubmissionError::Internal(_) => HandlerError::internal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationResult;

    #[test]
    fn test_validation_error_body() {
        let validation = FormValidation {
            valid: false,
            field_results: vec![
                ValidationResult::ok("name"),
                ValidationResult {
                    field_key: "phone".to_string(),
                    valid: false,
                    message: Some("Enter a valid 10-digit phone number".to_string()),
                    code: Some(FieldErrorCode::InvalidFormat),
                    discard_value: false,
                },
            ],
        };
        let err: HandlerError = SubmissionError::Validation(validation).into();
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Enter a valid 10-digit phone number");
        assert_eq!(body["errors"][0]["field"], "phone");
        assert_eq!(body["errors"][0]["code"], "invalid_format");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_persistence_error_hides_details() {
        let err: HandlerError = SubmissionError::Persistence("connection refused at 10.0.0.3".to_string()).into();
        assert_eq!(err.error, HandlerErrorKind::Internal);
        assert!(!err.message.contains("10.0.0.3"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
