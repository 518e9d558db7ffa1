//! HTTP backend exposing the request boundary.

pub mod proxy;

use crate::planner::{QueryRequest, QueryResponse, TravelPlanner};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(planner: TravelPlanner) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .with_state(planner)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(planner: TravelPlanner, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind backend to {}", addr))?;
    info!("Backend listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(planner)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn query(State(planner): State<TravelPlanner>, body: Bytes) -> Response {
    let request: QueryRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": format!("Invalid request body: {}", e) })),
            )
                .into_response();
        }
    };

    match planner.submit_query(&request.query).await {
        Ok(answer) => Json(QueryResponse::Answer { answer }).into_response(),
        Err(e) if e.is_input_error() => (
            StatusCode::BAD_REQUEST,
            Json(QueryResponse::Error {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": format!("Internal server error: {}", e) })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentLoop, ContextBuilder, ToolRegistry};
    use crate::test_support::{ScriptedProvider, spawn_server};
    use crate::traits::ChatResponse;
    use serde_json::Value;
    use std::sync::Arc;

    async fn backend(script: Vec<ChatResponse>) -> String {
        let planner = TravelPlanner::new(AgentLoop::new(
            Arc::new(ScriptedProvider::new(script)),
            ContextBuilder::new(),
            Arc::new(ToolRegistry::new()),
            "test-model",
        ));
        spawn_server(router(planner)).await
    }

    async fn post_query(url: &str, body: &str) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/query", url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn answers_query() {
        let url = backend(vec![ChatResponse::text("## Day 1")]).await;
        let (status, body) = post_query(&url, r#"{"query": "Kyoto"}"#).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"answer": "## Day 1"}));
    }

    #[tokio::test]
    async fn blank_query_is_bad_request() {
        let url = backend(vec![]).await;
        let (status, body) = post_query(&url, r#"{"query": "  "}"#).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "Query cannot be empty."}));

        let (status, _) = post_query(&url, "{}").await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn agent_failure_is_internal_error() {
        let url = backend(vec![]).await;
        let (status, body) = post_query(&url, r#"{"query": "Kyoto"}"#).await;
        assert_eq!(status, 500);
        assert!(body["detail"].as_str().unwrap().contains("provider unreachable"));
    }

    #[tokio::test]
    async fn malformed_body_is_unprocessable() {
        let url = backend(vec![]).await;
        let (status, body) = post_query(&url, "not json").await;
        assert_eq!(status, 422);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let url = backend(vec![]).await;
        let body: Value = reqwest::get(format!("{}/health", url))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }
}
