mod common;

use axum::{body::Body, http::{Request, StatusCode}};
use common::*;
use http_body_util::BodyExt;
use noteease_backend::model::{FormKind, SubmissionRecord};
use serde_json::{json, Value};
use tower::ServiceExt; // for .oneshot()

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_body(boundary: &str, texts: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend(format!("--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", boundary, name, value).as_bytes());
    }
    if let Some((name, filename, content)) = file {
        body.extend(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                boundary, name, filename
            )
            .as_bytes(),
        );
        body.extend(content);
        body.extend(b"\r\n");
    }
    body.extend(format!("--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn test_contact_json_returns_200() {
    init_tracing();
    let harness = Harness::new();
    let app = harness.router();

    let resp = app
        .oneshot(json_request(
            "/contact",
            json!({ "name": "Jane Doe", "message": "Hello there, this is a test." }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Message sent successfully! We will get back to you soon.");
    assert_eq!(harness.repo.stored(FormKind::Contact).len(), 1);
    assert_eq!(harness.notifier.wait_for_attempts(1).await, 1);
}

#[tokio::test]
async fn test_routes_are_mounted_under_api() {
    let harness = Harness::new();
    let app = harness.router();

    let resp = app
        .oneshot(json_request(
            "/api/generic-request",
            json!({
                "name": "Ravi Kumar",
                "phone": "9876543210",
                "address": "12 MG Road, Pune",
                "instructions": "Need a ten page report on renewable energy.",
                "pages": 10
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let stored = harness.repo.stored(FormKind::GenericRequest);
    match &stored[0] {
        SubmissionRecord::GenericRequest(r) => {
            assert_eq!(r.message, "Need a ten page report on renewable energy.");
            assert_eq!(r.pages, Some(10));
        }
        other => panic!("unexpected record {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_education_returns_400() {
    let harness = Harness::new();
    let app = harness.router();

    let resp = app
        .oneshot(json_request(
            "/writer",
            json!({
                "name": "Asha Verma",
                "phone": "8123456789",
                "motivation": "I have written for college magazines for three years."
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("education"));
    assert!(harness.repo.stored(FormKind::WriterApplication).is_empty());
}

#[tokio::test]
async fn test_invalid_field_returns_errors_list() {
    let harness = Harness::new();
    let app = harness.router();

    let resp = app
        .oneshot(json_request(
            "/contact",
            json!({ "name": "Jane Doe", "email": "a@b", "message": "Hello there, this is a test." }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["code"], "invalid_format");
}

#[tokio::test]
async fn test_unknown_key_returns_400() {
    let harness = Harness::new();
    let app = harness.router();

    let resp = app
        .oneshot(json_request(
            "/contact",
            json!({ "name": "Jane Doe", "message": "Hello there, this is a test.", "role": "admin" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Unknown field: role");
    assert!(harness.repo.stored(FormKind::Contact).is_empty());
}

#[tokio::test]
async fn test_repeated_json_key_returns_400() {
    let harness = Harness::new();
    let req = Request::builder()
        .method("POST")
        .uri("/contact")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"name":"Jane Doe","message":"Hello there, this is a test.","message":"Second message overriding"}"#,
        ))
        .unwrap();

    let resp = harness.router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Duplicate field: message");
    assert!(harness.repo.stored(FormKind::Contact).is_empty());
}

#[tokio::test]
async fn test_repeated_urlencoded_key_returns_400() {
    let harness = Harness::new();
    let req = Request::builder()
        .method("POST")
        .uri("/contact")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("name=Jane+Doe&message=Hello+there%2C+this+is+a+test.&message=Again+and+again"))
        .unwrap();

    let resp = harness.router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Duplicate field: message");
}

#[tokio::test]
async fn test_urlencoded_form_is_accepted() {
    let harness = Harness::new();
    let app = harness.router();

    let req = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("name=Jane+Doe&message=Hello+there%2C+this+is+a+test."))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    match &harness.repo.stored(FormKind::Contact)[0] {
        SubmissionRecord::Contact(c) => assert_eq!(c.message, "Hello there, this is a test."),
        other => panic!("unexpected record {:?}", other),
    }
}

#[tokio::test]
async fn test_writer_multipart_with_resume() {
    init_tracing();
    let harness = Harness::new();
    let app = harness.router();
    let boundary = "X-BOUNDARY";
    let body = multipart_body(
        boundary,
        &[
            ("name", "Asha Verma"),
            ("phone", "8123456789"),
            ("qualification", "MA English Literature"),
            ("experience", "I have written for college magazines for three years."),
        ],
        Some(("resume", "asha resume.pdf", b"%PDF-1.4 resume")),
    );

    let req = Request::builder()
        .method("POST")
        .uri("/writer-application")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let stored = harness.repo.stored(FormKind::WriterApplication);
    let file_ref = stored[0].file_ref().expect("stored file").to_string();
    assert!(file_ref.starts_with("writer/"));
    assert_eq!(harness.sink.names(), vec![file_ref]);
}

#[tokio::test]
async fn test_multipart_with_disallowed_file_still_creates_request() {
    let harness = Harness::new();
    let app = harness.router();
    let boundary = "X-BOUNDARY";
    let body = multipart_body(
        boundary,
        &[
            ("name", "Ravi Kumar"),
            ("phone", "9876543210"),
            ("address", "12 MG Road, Pune"),
            ("message", "Need a ten page report on renewable energy."),
        ],
        Some(("attachment", "script.sh", b"#!/bin/sh\necho hi\n")),
    );

    let req = Request::builder()
        .method("POST")
        .uri("/order")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(harness.sink.names().is_empty());
    assert_eq!(harness.repo.stored(FormKind::GenericRequest).len(), 1);
}

#[tokio::test]
async fn test_empty_file_part_under_unknown_name_returns_400() {
    let harness = Harness::new();
    let boundary = "X-BOUNDARY";
    let body = multipart_body(
        boundary,
        &[
            ("name", "Ravi Kumar"),
            ("phone", "9876543210"),
            ("address", "12 MG Road, Pune"),
            ("message", "Need a ten page report on renewable energy."),
        ],
        Some(("avatar", "", b"")),
    );

    let req = Request::builder()
        .method("POST")
        .uri("/request")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let resp = harness.router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Unknown field: avatar");
    assert!(harness.repo.stored(FormKind::GenericRequest).is_empty());
}

#[tokio::test]
async fn test_empty_file_part_for_declared_field_is_skipped() {
    let harness = Harness::new();
    let boundary = "X-BOUNDARY";
    let body = multipart_body(
        boundary,
        &[
            ("name", "Ravi Kumar"),
            ("phone", "9876543210"),
            ("address", "12 MG Road, Pune"),
            ("message", "Need a ten page report on renewable energy."),
        ],
        Some(("attachment", "", b"")),
    );

    let req = Request::builder()
        .method("POST")
        .uri("/request")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();
    let resp = harness.router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(harness.sink.names().is_empty());
    assert_eq!(harness.repo.stored(FormKind::GenericRequest).len(), 1);
}

#[tokio::test]
async fn test_persistence_failure_returns_generic_500() {
    let harness = Harness::with(MemoryRepository::failing(), RecordingNotifier::default());
    let app = harness.router();

    let resp = app
        .oneshot(json_request(
            "/contact",
            json!({ "name": "Jane Doe", "message": "Hello there, this is a test." }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Server error. Please try again later.");
    assert_eq!(harness.notifier.attempt_count(), 0);
}

#[tokio::test]
async fn test_unsupported_content_type_returns_415() {
    let harness = Harness::new();
    let req = Request::builder()
        .method("POST")
        .uri("/contact")
        .header("content-type", "text/plain")
        .body(Body::from("name=Jane"))
        .unwrap();

    let resp = harness.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_body_over_limit_returns_413() {
    let harness = Harness::new();
    let huge = "a".repeat(6 * 1024 * 1024);
    let resp = harness
        .router()
        .oneshot(json_request("/contact", json!({ "name": "Jane Doe", "message": huge })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(harness.repo.stored(FormKind::Contact).is_empty());
}

#[tokio::test]
async fn test_cors_preflight_for_allowed_origin() {
    let harness = Harness::new();
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/contact")
        .header("origin", "https://pradyumanmishra20.github.io")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let resp = harness.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "https://pradyumanmishra20.github.io"
    );
    assert_eq!(harness.notifier.attempt_count(), 0);
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let harness = Harness::new();
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/contact")
        .header("origin", "https://evil.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let resp = harness.router().oneshot(req).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_health_and_banner() {
    let harness = Harness::new();

    let resp = harness
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");

    let resp = harness
        .router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
