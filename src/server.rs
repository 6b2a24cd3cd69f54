use crate::config::RelayConfig;
use crate::error::Result;
use crate::guard::AccessGuard;
use crate::logging::SharedLogger;
use crate::providers::ChatModel;
use crate::proxy::{self, CallerCredentials};
use crate::translate::unified::RelayResponse;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub guard: AccessGuard,
    pub client: reqwest::Client,
    pub logger: SharedLogger,
}

impl AppState {
    /// Build the shared state, deriving the allow-list guard and the upstream
    /// HTTP client from `config`.
    pub fn new(config: RelayConfig, logger: SharedLogger) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.upstream_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            guard: AccessGuard::new(config.allowed_ids.iter().cloned()),
            config,
            client,
            logger,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(handle_chat))
        .route("/v1/chat/completions", post(handle_chat))
        .route("/health", get(handle_health))
        .route("/v1/models", get(handle_models))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let credentials = credentials_from_headers(&headers, &state.config.identity_header);
    let reply = proxy::route(&state, &credentials, &body).await;
    json_reply(&reply)
}

/// Every chat reply, including errors, goes out as 200 JSON.
fn json_reply(reply: &RelayResponse) -> Response {
    match serde_json::to_vec(reply) {
        Ok(bytes) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            tracing::error!("Failed to serialize reply: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn credentials_from_headers(headers: &HeaderMap, identity_header: &str) -> CallerCredentials {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    CallerCredentials {
        identity: value(identity_header),
        authorization: value(header::AUTHORIZATION.as_str()),
    }
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_models() -> Json<serde_json::Value> {
    let models: Vec<serde_json::Value> = ChatModel::all()
        .iter()
        .map(|model| {
            serde_json::json!({
                "id": model.id,
                "object": "model",
                "owned_by": model.provider,
            })
        })
        .collect();

    Json(serde_json::json!({ "data": models, "object": "list" }))
}
