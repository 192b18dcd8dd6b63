use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use bytes::BytesMut;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::dto::submission_dto::{values_from_json, values_from_pairs, JsonFields, PayloadBuilder, SubmissionResponse};
use crate::model::{FieldValues, FormKind, UploadedFile};
use crate::service::submission_service::SubmissionService;
use crate::util::error::{HandlerError, HandlerErrorKind};

pub type SubmissionState = Arc<dyn SubmissionService>;

fn rejection(status: StatusCode, message: String) -> HandlerError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        HandlerError::new(HandlerErrorKind::PayloadTooLarge, "Request body is too large")
    } else {
        HandlerError::bad_request(message)
    }
}

/// One handler for every form; `kind` selects the field set.
pub async fn submit_handler(
    kind: FormKind,
    State(service): State<SubmissionState>,
    request: Request,
) -> Result<(StatusCode, Json<SubmissionResponse>), HandlerError> {
    info!("[submit_handler] {} submission received", kind);

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    let values = if content_type.starts_with("application/json") {
        let Json(body) = Json::<JsonFields>::from_request(request, &()).await.map_err(|e| {
            error!("[submit_handler] Invalid JSON body: {}", e.body_text());
            rejection(e.status(), "Invalid JSON body".to_string())
        })?;
        values_from_json(service.registry(), kind, body)?
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &()).await.map_err(|e| {
            error!("[submit_handler] Invalid form body: {}", e.body_text());
            rejection(e.status(), "Invalid form body".to_string())
        })?;
        values_from_pairs(service.registry(), kind, pairs)?
    } else if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &()).await.map_err(|e| {
            error!("[submit_handler] Invalid multipart body: {}", e.body_text());
            rejection(e.status(), "Invalid multipart body".to_string())
        })?;
        read_multipart(service.as_ref(), kind, multipart).await?
    } else {
        warn!("[submit_handler] Unsupported content type: {:?}", content_type);
        return Err(HandlerError::new(
            HandlerErrorKind::UnsupportedMediaType,
            "Send the form as JSON, urlencoded or multipart data",
        ));
    };

    let receipt = service.handle_submission(kind, values).await.map_err(|e| {
        info!("[submit_handler] {} submission not accepted: {}", kind, e);
        HandlerError::from(e)
    })?;

    Ok((StatusCode::OK, Json(SubmissionResponse::accepted(kind, receipt.id))))
}

async fn read_multipart(
    service: &dyn SubmissionService,
    kind: FormKind,
    mut multipart: Multipart,
) -> Result<FieldValues, HandlerError> {
    let mut builder = PayloadBuilder::new(service.registry(), kind);

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        error!("[submit_handler] Error getting next field: {}", e);
        rejection(e.status(), format!("Failed to read form field: {}", e.body_text()))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field.file_name().map(|s| s.to_string()) {
            Some(filename) => {
                let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
                let mut buf = BytesMut::new();
                while let Some(chunk) = field.chunk().await.map_err(|e| {
                    error!("[submit_handler] Error reading file chunk: {}", e);
                    rejection(e.status(), "Failed to read uploaded file".to_string())
                })? {
                    buf.extend_from_slice(&chunk);
                }
                // Browsers send an empty part when no file was chosen.
                if filename.is_empty() && buf.is_empty() {
                    builder.ensure_known(&name)?;
                    debug!("[submit_handler] Skipping empty file part '{}'", name);
                    continue;
                }
                debug!("[submit_handler] Received file '{}' for '{}' ({} bytes)", filename, name, buf.len());
                builder.push_file(&name, UploadedFile::new(filename, content_type, buf.freeze()))?;
            }
            None => {
                let text = field.text().await.map_err(|e| {
                    error!("[submit_handler] Failed to read field '{}': {}", name, e);
                    rejection(e.status(), format!("Failed to read field {}", name))
                })?;
                builder.push_text(&name, text)?;
            }
        }
    }

    Ok(builder.finish())
}
