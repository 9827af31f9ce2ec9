//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use akara_config::{BhashiniConfig, ConfigError, Credentials, RetryConfig, RetryScope, Settings};
use akara_persistence::{InMemoryTranscriptionStore, TranscriptionStore};
use akara_pipeline::BhashiniAgent;
use akara_server::{create_router, AppState};

const BOUNDARY: &str = "akara-test-boundary";

fn credentials() -> Credentials {
    let map: HashMap<&str, &str> = HashMap::from([
        ("BHASHINI_USER_ID", "user-1"),
        ("ULCA_API_KEY", "ulca-1"),
        ("BHASHINI_AUTH_TOKEN", "auth-1"),
    ]);
    Credentials::from_lookup(|name| map.get(name).map(|v| v.to_string())).unwrap()
}

fn bhashini_config(server: &MockServer) -> BhashiniConfig {
    BhashiniConfig {
        config_url: format!("{}/config", server.uri()),
        retry: RetryConfig {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            scope: RetryScope::WholePipeline,
        },
        ..BhashiniConfig::default()
    }
}

fn unavailable_agent() -> Result<BhashiniAgent, ConfigError> {
    Err(ConfigError::MissingCredential("BHASHINI_USER_ID".into()))
}

async fn mount_bhashini(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pipelineResponseConfig": [
                {"config": [{"serviceId": "S1"}]},
                {"config": [{"serviceId": "S2"}]},
                {"config": [{"serviceId": "S3"}]}
            ],
            "pipelineInferenceAPIEndPoint": {
                "callbackUrl": format!("{}/compute", server.uri()),
                "inferenceApiKey": {"name": "Authorization", "value": "inference-key"}
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/compute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pipelineResponse": [
                {"output": [{"source": "नमस्ते"}]},
                {"output": [{"target": "Hello"}]},
                {"audio": [{"audioContent": "QUJD"}]}
            ]
        })))
        .mount(server)
        .await;
}

fn silent_wav() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..16_000 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Build a multipart body with one file part and optional text parts
fn multipart_body(filename: &str, content_type: &str, data: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_banner_and_health() {
    let app = create_router(AppState::in_memory(Settings::default(), unavailable_agent()));

    let (status, body) = send(app.clone(), get("/api/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Akara Backend API is running");

    let (status, body) = send(app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["service"], "Akara API");
}

#[tokio::test]
async fn test_transcription_health_degraded_without_agent() {
    let app = create_router(AppState::in_memory(Settings::default(), unavailable_agent()));

    let (status, body) = send(app, get("/api/transcription/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["bhashini_agent"], "unhealthy");
    assert_eq!(body["services"]["database"], "healthy");
}

#[tokio::test]
async fn test_languages_unavailable_without_agent() {
    let app = create_router(AppState::in_memory(Settings::default(), unavailable_agent()));

    let (status, body) = send(app, get("/api/transcription/languages")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
}

#[tokio::test]
async fn test_languages_catalog() {
    let server = MockServer::start().await;
    let agent = BhashiniAgent::new(credentials(), &bhashini_config(&server));
    let app = create_router(AppState::in_memory(Settings::default(), agent));

    let (status, body) = send(app, get("/api/transcription/languages")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source_languages"].as_object().unwrap().len(), 12);
    assert_eq!(body["target_languages"]["hi"], "Hindi");
    assert_eq!(body["models"]["bhashini"], "Bhashini (Government of India)");
}

#[tokio::test]
async fn test_transcribe_without_agent_is_503() {
    let app = create_router(AppState::in_memory(Settings::default(), unavailable_agent()));
    let body = multipart_body("clip.wav", "audio/wav", &silent_wav(), &[]);

    let (status, _) = send(app, multipart_request("/api/transcription/transcribe", body)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_transcribe_rejects_unsupported_format() {
    let server = MockServer::start().await;
    let agent = BhashiniAgent::new(credentials(), &bhashini_config(&server));
    let app = create_router(AppState::in_memory(Settings::default(), agent));
    let body = multipart_body("notes.txt", "text/plain", b"hello", &[]);

    let (status, body) = send(app, multipart_request("/api/transcription/transcribe", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Unsupported file format"));
}

#[tokio::test]
async fn test_transcribe_rejects_oversized_file() {
    let server = MockServer::start().await;
    let agent = BhashiniAgent::new(credentials(), &bhashini_config(&server));
    let mut settings = Settings::default();
    settings.server.max_upload_bytes = 1024;
    let app = create_router(AppState::in_memory(settings, agent));
    let body = multipart_body("clip.wav", "audio/wav", &silent_wav(), &[]);

    let (status, body) = send(app, multipart_request("/api/transcription/transcribe", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("File too large"));
}

#[tokio::test]
async fn test_transcribe_corrupt_audio_is_400() {
    let server = MockServer::start().await;
    let agent = BhashiniAgent::new(credentials(), &bhashini_config(&server));
    let app = create_router(AppState::in_memory(Settings::default(), agent));
    let body = multipart_body("clip.wav", "audio/wav", b"definitely not audio", &[]);

    let (status, body) = send(app, multipart_request("/api/transcription/transcribe", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "audio_processing");
}

#[tokio::test]
async fn test_transcribe_end_to_end_and_history() {
    let server = MockServer::start().await;
    mount_bhashini(&server).await;

    let store = Arc::new(InMemoryTranscriptionStore::new());
    let agent = BhashiniAgent::new(credentials(), &bhashini_config(&server));
    let app = create_router(AppState::new(Settings::default(), agent, store.clone()));

    let body = multipart_body(
        "clip.wav",
        "audio/wav",
        &silent_wav(),
        &[("source_language", "hi"), ("target_language", "en")],
    );
    let (status, body) = send(app.clone(), multipart_request("/api/transcription/transcribe", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transcript"], "नमस्ते");
    assert_eq!(body["translation"], "Hello");
    assert_eq!(body["translated_audio"], "QUJD");
    assert_eq!(body["source_language"], "hi");
    assert_eq!(body["target_language"], "en");
    assert_eq!(body["model_name"], "bhashini");
    assert!(body["processing_time"].as_f64().unwrap() >= 0.0);
    assert!(body["id"].as_str().is_some());
    assert_eq!(store.len(), 1);

    let (status, history) = send(app, get("/api/transcription/history?limit=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["total"], 1);
    assert_eq!(history["limit"], 5);
    assert_eq!(history["offset"], 0);
    assert_eq!(history["history"][0]["filename"], "clip.wav");
    assert_eq!(history["history"][0]["id"], body["id"]);
}

#[tokio::test]
async fn test_transcribe_discovery_failure_is_503() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let agent = BhashiniAgent::new(credentials(), &bhashini_config(&server));
    let app = create_router(AppState::in_memory(Settings::default(), agent));
    let body = multipart_body("clip.wav", "audio/wav", &silent_wav(), &[]);

    let (status, body) = send(app, multipart_request("/api/transcription/transcribe", body)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "pipeline_config");
}

#[tokio::test]
async fn test_upload_runs_in_background() {
    let server = MockServer::start().await;
    mount_bhashini(&server).await;

    let store = Arc::new(InMemoryTranscriptionStore::new());
    let agent = BhashiniAgent::new(credentials(), &bhashini_config(&server));
    let app = create_router(AppState::new(Settings::default(), agent, store.clone()));

    let wav = silent_wav();
    let body = multipart_body("meeting.wav", "audio/x-wav", &wav, &[]);
    let (status, body) = send(app, multipart_request("/api/transcription/upload", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File uploaded successfully. Processing started.");
    assert_eq!(body["filename"], "meeting.wav");
    assert_eq!(body["file_size"], wav.len());
    assert_eq!(body["supported_formats"].as_array().unwrap().len(), 12);

    for _ in 0..100 {
        if !store.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let page = store.history(10, 0).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.records[0].filename, "meeting.wav");
    assert_eq!(page.records[0].translation, "Hello");
}

#[tokio::test]
async fn test_detect_language_falls_back_without_agent() {
    let app = create_router(AppState::in_memory(Settings::default(), unavailable_agent()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/transcription/detect-language")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"text": "नमस्ते दुनिया"}).to_string()))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "en");
}

#[tokio::test]
async fn test_metrics_endpoint_responds() {
    let app = create_router(AppState::in_memory(Settings::default(), unavailable_agent()));
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
