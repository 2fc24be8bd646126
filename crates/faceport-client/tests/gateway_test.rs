//! Gateway integration tests against a mock face service.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use faceport_client::{
    ApiClient, ClientConfig, Endpoints, GatewayError, RegistrationRequest,
};
use faceport_media::ImageReference;
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What the mock backend observed in a multipart upload.
#[derive(Debug, Default, Clone)]
struct SeenUpload {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

type Seen = Arc<Mutex<Option<SeenUpload>>>;

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn client_for(base: &str, detect_timeout: Duration) -> ApiClient {
    ApiClient::new(ClientConfig {
        endpoints: Endpoints::from_base(base),
        detect_timeout,
    })
    .unwrap()
}

fn staged_photo(dir: &Path) -> ImageReference {
    let path = dir.join("me.png");
    std::fs::write(&path, b"png-ish bytes").unwrap();
    ImageReference {
        uri: path.to_string_lossy().into_owned(),
        mime_type: "image/png".to_string(),
        file_name: "me.png".to_string(),
    }
}

async fn drain_upload(mut multipart: Multipart) -> SeenUpload {
    let mut upload = SeenUpload::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => upload.name = Some(field.text().await.unwrap()),
            "photo" => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = field.bytes().await.unwrap().to_vec();
            }
            other => panic!("unexpected multipart field: {other}"),
        }
    }
    upload
}

#[tokio::test]
async fn register_forwards_multipart_fields_verbatim() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/api/register",
            post(
                |State(seen): State<Seen>, multipart: Multipart| async move {
                    *seen.lock().unwrap() = Some(drain_upload(multipart).await);
                    (
                        StatusCode::CREATED,
                        Json(json!({"message": "User registered successfully", "user_id": "u1"})),
                    )
                },
            ),
        )
        .with_state(seen.clone());
    let base = spawn_backend(router).await;
    let client = client_for(&base, Duration::from_secs(30));

    let tmp = tempfile::tempdir().unwrap();
    let request = RegistrationRequest {
        name: "  alice  ".to_string(),
        photo: staged_photo(tmp.path()),
    };
    let receipt = client.register(&request).await.unwrap();
    assert_eq!(receipt.message, "User registered successfully");
    assert_eq!(receipt.user_id.as_deref(), Some("u1"));

    let upload = seen.lock().unwrap().clone().unwrap();
    assert_eq!(upload.name.as_deref(), Some("alice"));
    assert_eq!(upload.file_name.as_deref(), Some("me.png"));
    assert_eq!(upload.content_type.as_deref(), Some("image/png"));
    assert_eq!(upload.bytes, b"png-ish bytes");
}

#[tokio::test]
async fn register_rejection_carries_status_and_body() {
    let router = Router::new().route(
        "/api/register",
        post(|multipart: Multipart| async move {
            drain_upload(multipart).await;
            (
                StatusCode::CONFLICT,
                Json(json!({"error": "User with this name already exists"})),
            )
        }),
    );
    let base = spawn_backend(router).await;
    let client = client_for(&base, Duration::from_secs(30));

    let tmp = tempfile::tempdir().unwrap();
    let request = RegistrationRequest {
        name: "alice".to_string(),
        photo: staged_photo(tmp.path()),
    };
    let err = client.register(&request).await.unwrap_err();
    match &err {
        GatewayError::Api { status, body } => {
            assert_eq!(*status, 409);
            assert!(body.contains("already exists"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(
        err.api_message().as_deref(),
        Some("User with this name already exists")
    );
}

#[tokio::test]
async fn register_missing_photo_file_fails_before_any_send() {
    let request = RegistrationRequest {
        name: "alice".to_string(),
        photo: ImageReference {
            uri: "/definitely/not/here.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            file_name: "here.jpg".to_string(),
        },
    };
    // Unroutable endpoint: if the staged-photo read failed to short-circuit,
    // this would surface as a transport error instead.
    let client = client_for("http://127.0.0.1:1/api", Duration::from_secs(30));
    let err = client.register(&request).await.unwrap_err();
    assert!(matches!(err, GatewayError::Staging { .. }));
}

#[tokio::test]
async fn detect_sends_fixed_capture_part_and_parses_outcome() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/api/detect",
            post(
                |State(seen): State<Seen>, multipart: Multipart| async move {
                    *seen.lock().unwrap() = Some(drain_upload(multipart).await);
                    Json(json!({
                        "faces_detected": 1,
                        "face_locations": [[10, 20, 30, 40]],
                        "recognition": {
                            "recognized": true,
                            "user_name": "Alice",
                            "confidence": 0.97,
                            "method": "embedding"
                        }
                    }))
                },
            ),
        )
        .with_state(seen.clone());
    let base = spawn_backend(router).await;
    let client = client_for(&base, Duration::from_secs(30));

    let tmp = tempfile::tempdir().unwrap();
    let staged = tmp.path().join("photo.jpg");
    std::fs::write(&staged, b"jpeg bytes").unwrap();
    let capture = ImageReference::for_capture(&staged);

    let outcome = client.detect(&capture).await.unwrap();
    assert_eq!(outcome.faces_detected, 1);
    assert!(outcome.recognized);
    assert_eq!(outcome.user_name.as_deref(), Some("Alice"));

    let upload = seen.lock().unwrap().clone().unwrap();
    assert_eq!(upload.name, None);
    assert_eq!(upload.file_name.as_deref(), Some("photo.jpg"));
    assert_eq!(upload.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(upload.bytes, b"jpeg bytes");
}

#[tokio::test]
async fn detect_deadline_aborts_stalled_request() {
    let router = Router::new().route(
        "/api/detect",
        post(|multipart: Multipart| async move {
            drain_upload(multipart).await;
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(json!({"faces_detected": 0}))
        }),
    );
    let base = spawn_backend(router).await;
    let client = client_for(&base, Duration::from_millis(200));

    let tmp = tempfile::tempdir().unwrap();
    let staged = tmp.path().join("photo.jpg");
    std::fs::write(&staged, b"jpeg bytes").unwrap();

    let started = Instant::now();
    let err = client
        .detect(&ImageReference::for_capture(&staged))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn detect_transport_failure_is_not_a_timeout() {
    // Nothing listens on port 1.
    let client = client_for("http://127.0.0.1:1/api", Duration::from_secs(30));

    let tmp = tempfile::tempdir().unwrap();
    let staged = tmp.path().join("photo.jpg");
    std::fs::write(&staged, b"jpeg bytes").unwrap();

    let err = client
        .detect(&ImageReference::for_capture(&staged))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn users_remove_and_health_follow_documented_shapes() {
    let router = Router::new()
        .route(
            "/api/users",
            get(|| async {
                Json(json!({
                    "users": [
                        {"_id": "u1", "name": "Alice", "created_at": "2026-08-01"},
                        {"_id": "u2", "name": "Bob", "image_url": "/uploads/bob.jpg"}
                    ],
                    "total_count": 2
                }))
            }),
        )
        .route(
            "/api/user/:id",
            delete(|| async { Json(json!({"message": "User deleted successfully"})) }),
        )
        .route(
            "/api/health",
            get(|| async {
                Json(json!({"status": "healthy", "message": "Face Detection API is running"}))
            }),
        );
    let base = spawn_backend(router).await;
    let client = client_for(&base, Duration::from_secs(30));

    let listing = client.list_users().await.unwrap();
    assert_eq!(listing.total_count, 2);
    assert_eq!(listing.users[0].id, "u1");
    assert_eq!(listing.users[1].name, "Bob");

    let message = client.remove_user("u2").await.unwrap();
    assert_eq!(message, "User deleted successfully");

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn remove_unknown_user_surfaces_api_error() {
    let router = Router::new().route(
        "/api/user/:id",
        delete(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "User not found"})),
            )
        }),
    );
    let base = spawn_backend(router).await;
    let client = client_for(&base, Duration::from_secs(30));

    let err = client.remove_user("ghost").await.unwrap_err();
    assert_eq!(err.api_message().as_deref(), Some("User not found"));
}

#[tokio::test]
async fn detect_unparseable_body_is_a_parse_error() {
    let router = Router::new().route(
        "/api/detect",
        post(|multipart: Multipart| async move {
            drain_upload(multipart).await;
            "definitely not json"
        }),
    );
    let base = spawn_backend(router).await;
    let client = client_for(&base, Duration::from_secs(30));

    let tmp = tempfile::tempdir().unwrap();
    let staged = tmp.path().join("photo.jpg");
    std::fs::write(&staged, b"jpeg bytes").unwrap();

    let err = client
        .detect(&ImageReference::for_capture(&staged))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
}
