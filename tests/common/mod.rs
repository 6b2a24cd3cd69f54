//! In-process stand-in for the ChatGPT and Gemini upstreams.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use chat_relay::{AppState, RelayConfig, SharedLogger};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone)]
pub enum StubReply {
    Json(Value),
    Raw(&'static str),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
    pub raw_body: String,
}

struct StubState {
    reply: StubReply,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct StubUpstream {
    pub base_url: String,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubUpstream {
    pub async fn start(reply: StubReply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(StubState {
            reply,
            calls: calls.clone(),
            requests: requests.clone(),
        });

        let router = Router::new()
            .route("/chatgpt", post(upstream_handler))
            .route("/gemini", post(upstream_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub upstream local addr");

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                eprintln!("Stub upstream error: {err:?}");
            }
        });

        StubUpstream {
            base_url: format!("http://{addr}"),
            calls,
            requests,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedCall> {
        self.requests.lock().unwrap().clone()
    }

    pub fn config(&self) -> RelayConfig {
        let mut config = RelayConfig::with_allowed_ids(["wxid1", "wxid2"]);
        config.upstream.chatgpt_url = format!("{}/chatgpt", self.base_url);
        config.upstream.gemini_url = format!("{}/gemini", self.base_url);
        config
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.config(), SharedLogger::in_memory()).expect("app state")
    }
}

async fn upstream_handler(
    State(state): State<Arc<StubState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(RecordedCall {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        raw_body: String::from_utf8_lossy(&body).into_owned(),
    });

    match &state.reply {
        StubReply::Json(value) => (StatusCode::OK, axum::Json(value.clone())).into_response(),
        StubReply::Raw(text) => (StatusCode::BAD_GATEWAY, *text).into_response(),
    }
}

/// An address nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
