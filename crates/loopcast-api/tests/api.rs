//! API integration tests.

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use loopcast_api::{create_router, ApiConfig, AppState};
use loopcast_models::ProgressEvent;

/// Build a router over temporary storage with fast stream timings.
///
/// The TempDir is returned so the storage directories outlive the test.
async fn test_app() -> (Router, AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = ApiConfig {
        upload_dir: dir.path().join("uploads"),
        output_dir: dir.path().join("output"),
        poll_interval: Duration::from_millis(10),
        idle_threshold: Duration::from_millis(100),
        ..ApiConfig::default()
    };

    let state = AppState::new(config).await.unwrap();
    (create_router(state.clone()), state, dir)
}

fn multipart_request(uri: &str, fields: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = Vec::new();
    for (name, filename, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(fname) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\r\n",
                    name, fname
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state, _dir) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
}

/// Test the submission options listing.
#[tokio::test]
async fn test_options_endpoint_lists_parameter_sets() {
    let (app, _state, _dir) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["fps_options"], serde_json::json!([5, 10, 15, 20, 25, 30]));
    assert_eq!(json["scale_options"][4]["label"], "720p");
    assert_eq!(json["format_options"][0]["value"], "gif");
    assert_eq!(json["defaults"]["fps"], 10);
    assert_eq!(json["defaults"]["scale"], "480:-1");
    assert_eq!(json["defaults"]["format"], "gif");
}

/// A submission without a video file is sent back to the form.
#[tokio::test]
async fn test_convert_without_file_redirects_to_root() {
    let (app, _state, _dir) = test_app().await;

    let request = multipart_request("/convert", &[("fps", None, b"10")]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

/// A second submission while one runs is rejected with 409.
#[tokio::test]
async fn test_convert_is_single_flight() {
    let (app, state, _dir) = test_app().await;
    state.converting.store(true, Ordering::SeqCst);

    let request = multipart_request(
        "/convert",
        &[("video", Some("clip.mp4"), b"not a real video")],
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    // The guard belongs to the conversion that is still "running".
    assert!(state.converting.load(Ordering::SeqCst));
}

/// The progress stream frames queue items as SSE and ends on completion.
#[tokio::test]
async fn test_stream_output_delivers_events_and_completes() {
    let (app, state, _dir) = test_app().await;

    state
        .events
        .push(ProgressEvent::Line("Progress: 50% - frame= 10".to_string()));
    state.events.push(ProgressEvent::ProcessExited { success: true });

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stream-output")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    // The stream is finite: completion closes it, so the body collects.
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(body.contains(r#"data: {"output":"Progress: 50% - frame= 10"}"#));
    assert!(body.contains(r#"data: {"status":"complete"}"#));
}

/// An idle queue heartbeats, then completes after the idle window.
#[tokio::test]
async fn test_stream_output_idle_timeout_completes() {
    let (app, _state, _dir) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stream-output")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(body.contains(r#"data: {"heartbeat":true}"#));
    assert!(body.ends_with("data: {\"status\":\"complete\"}\n\n"));
}
