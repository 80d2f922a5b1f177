//! In-process stand-in for the HDR processing service, used by async tests.

use crate::utils::image_file::png_fixture;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone)]
pub enum UploadReply {
    Assign(&'static str),
    /// Replies with the uploaded file's own name.
    EchoFileName,
    Body(Value),
    Status(u16, Value),
}

#[derive(Clone)]
pub enum ProcessReply {
    /// Replies with `processed_HDR_{filename}` like the real service.
    Echo,
    Body(Value),
    Status(u16, Value),
    Raw(&'static str),
}

/// A filename whose processing is delayed and whose processed image differs.
#[derive(Clone)]
pub struct SlowName {
    pub name: &'static str,
    pub delay: Duration,
    pub image: Vec<u8>,
}

#[derive(Clone)]
pub struct MockService {
    pub upload: UploadReply,
    pub process: ProcessReply,
    pub slow: Option<SlowName>,
    pub processed_image: Vec<u8>,
}

impl Default for MockService {
    fn default() -> Self {
        Self {
            upload: UploadReply::Assign("abc.png"),
            process: ProcessReply::Echo,
            slow: None,
            processed_image: png_fixture(12, 9),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedProcess {
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct Recorded {
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    process_calls: Arc<Mutex<Vec<RecordedProcess>>>,
    static_hits: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().expect("uploads lock").clone()
    }

    pub fn process_calls(&self) -> Vec<RecordedProcess> {
        self.process_calls.lock().expect("process lock").clone()
    }

    pub fn static_hits(&self) -> Vec<String> {
        self.static_hits.lock().expect("static lock").clone()
    }
}

#[derive(Clone)]
struct MockState {
    service: Arc<MockService>,
    recorded: Recorded,
}

pub struct RunningMock {
    pub base_url: String,
    pub service: Arc<MockService>,
    pub recorded: Recorded,
}

pub async fn spawn_mock_service(service: MockService) -> RunningMock {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");

    let state = MockState {
        service: Arc::new(service),
        recorded: Recorded::default(),
    };
    let app = Router::new()
        .route("/upload", post(handle_upload))
        .route("/process", post(handle_process))
        .route("/static/processed/:name", get(handle_static))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    RunningMock {
        base_url: format!("http://{addr}"),
        service: state.service,
        recorded: state.recorded,
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).expect("valid status code")
}

async fn handle_upload(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut uploaded_name = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        uploaded_name = file_name.clone();
        state
            .recorded
            .uploads
            .lock()
            .expect("uploads lock")
            .push(RecordedUpload {
                file_name,
                content_type,
                bytes,
            });
    }

    match &state.service.upload {
        UploadReply::Assign(name) => Json(json!({ "filename": name })).into_response(),
        UploadReply::EchoFileName => Json(json!({ "filename": uploaded_name })).into_response(),
        UploadReply::Body(body) => Json(body.clone()).into_response(),
        UploadReply::Status(code, body) => (status(*code), Json(body.clone())).into_response(),
    }
}

async fn handle_process(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state
        .recorded
        .process_calls
        .lock()
        .expect("process lock")
        .push(RecordedProcess {
            content_type,
            body: body.clone(),
        });

    if let Some(slow) = &state.service.slow {
        if body["filename"] == slow.name {
            tokio::time::sleep(slow.delay).await;
        }
    }

    match &state.service.process {
        ProcessReply::Echo => {
            let filename = body["filename"].as_str().unwrap_or_default();
            Json(json!({ "processed_filename": format!("processed_HDR_{filename}") }))
                .into_response()
        }
        ProcessReply::Body(reply) => Json(reply.clone()).into_response(),
        ProcessReply::Status(code, reply) => (status(*code), Json(reply.clone())).into_response(),
        ProcessReply::Raw(text) => (
            [(header::CONTENT_TYPE, "application/json")],
            text.to_string(),
        )
            .into_response(),
    }
}

async fn handle_static(State(state): State<MockState>, Path(name): Path<String>) -> Response {
    state
        .recorded
        .static_hits
        .lock()
        .expect("static lock")
        .push(name.clone());

    if let Some(slow) = &state.service.slow {
        if name == format!("processed_HDR_{}", slow.name) {
            return ([(header::CONTENT_TYPE, "image/png")], slow.image.clone()).into_response();
        }
    }

    if name.starts_with("processed_HDR_") {
        (
            [(header::CONTENT_TYPE, "image/png")],
            state.service.processed_image.clone(),
        )
            .into_response()
    } else {
        (status(404), Json(json!({ "error": "File not found" }))).into_response()
    }
}
