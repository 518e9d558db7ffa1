//! Thin front proxy: validates the query, forwards it to the backend and
//! maps backend failures to caller-visible statuses.

use crate::error::EMPTY_QUERY_MESSAGE;
use crate::planner::{QueryRequest, QueryResponse};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const NO_ANSWER: &str = "No answer returned.";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to reach backend: {0}")]
    Unreachable(reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Invalid JSON from backend.")]
    InvalidJson,
}

impl UpstreamError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Unreachable(_) | Self::InvalidJson => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    backend_url: String,
}

impl ProxyState {
    pub fn new(backend_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build proxy HTTP client")?;

        Ok(Self {
            client,
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub async fn forward(&self, query: &str) -> Result<String, UpstreamError> {
        let response = self
            .client
            .post(format!("{}/query", self.backend_url))
            .json(&QueryRequest {
                query: query.to_string(),
            })
            .send()
            .await
            .map_err(UpstreamError::Unreachable)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: backend_error_text(&text),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|_| UpstreamError::InvalidJson)?;

        Ok(payload
            .get("answer")
            .and_then(Value::as_str)
            .unwrap_or(NO_ANSWER)
            .to_string())
    }
}

/// Prefers the backend's `detail` or `error` field, else the raw body.
fn backend_error_text(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").or_else(|| v.get("error")).cloned())
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| body.to_string())
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(QueryResponse::Error { error })).into_response()
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/query", post(query))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: ProxyState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind proxy to {}", addr))?;
    info!(
        backend = state.backend_url(),
        "Proxy listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn query(State(state): State<ProxyState>, body: Bytes) -> Response {
    let request: QueryRequest = serde_json::from_slice(&body).unwrap_or_default();
    let query = request.query.trim();
    if query.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, EMPTY_QUERY_MESSAGE.to_string());
    }

    match state.forward(query).await {
        Ok(answer) => Json(QueryResponse::Answer { answer }).into_response(),
        Err(e) => {
            warn!(error = %e, status = %e.status(), "Backend request failed");
            error_response(e.status(), e.to_string())
        }
    }
}
