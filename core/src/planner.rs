use crate::agent::{AgentLoop, ContextBuilder};
use crate::config::Config;
use crate::error::QueryError;
use crate::providers::create_provider;
use crate::tools::build_registry;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Answer { answer: String },
    Error { error: String },
}

/// The request boundary: one free-text query in, one answer out.
#[derive(Clone)]
pub struct TravelPlanner {
    agent: Arc<AgentLoop>,
}

impl TravelPlanner {
    pub fn new(agent: AgentLoop) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(config)?;
        let registry = build_registry(config)?;

        let agent = AgentLoop::new(
            provider,
            ContextBuilder::new(),
            Arc::new(registry),
            config.model.clone(),
        )
        .with_temperature(config.temperature)
        .with_max_iterations(config.max_iterations);

        Ok(Self::new(agent))
    }

    /// Blank input is rejected before any reasoning call is made.
    pub async fn submit_query(&self, query: &str) -> Result<String, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            warn!("Rejected empty query");
            return Err(QueryError::EmptyQuery);
        }

        let request_id = uuid::Uuid::new_v4();
        let span = info_span!("query", %request_id);

        async move {
            info!(query, "Received travel query");
            match self.agent.process(query).await {
                Ok(answer) => {
                    info!(answer_chars = answer.len(), "Travel query processed");
                    Ok(answer)
                }
                Err(e) => {
                    error!(error = %e, "Travel query failed");
                    Err(e.into())
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn respond(&self, query: &str) -> QueryResponse {
        match self.submit_query(query).await {
            Ok(answer) => QueryResponse::Answer { answer },
            Err(e) => QueryResponse::Error {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolRegistry;
    use crate::error::{AgentError, EMPTY_QUERY_MESSAGE};
    use crate::test_support::ScriptedProvider;
    use crate::traits::ChatResponse;
    use serde_json::json;

    fn planner(provider: Arc<ScriptedProvider>) -> TravelPlanner {
        TravelPlanner::new(AgentLoop::new(
            provider,
            ContextBuilder::new(),
            Arc::new(ToolRegistry::new()),
            "test-model",
        ))
    }

    #[tokio::test]
    async fn blank_query_never_reaches_provider() {
        let provider = Arc::new(ScriptedProvider::new(vec![ChatResponse::text("unused")]));
        let planner = planner(provider.clone());

        for query in ["", "   ", "\n\t"] {
            let err = planner.submit_query(query).await.unwrap_err();
            assert!(err.is_input_error());
            assert_eq!(err.to_string(), EMPTY_QUERY_MESSAGE);
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn answer_is_terminal_text() {
        let provider = Arc::new(ScriptedProvider::new(vec![ChatResponse::text("# Lisbon")]));
        let planner = planner(provider.clone());

        assert_eq!(planner.submit_query("  Lisbon for 2 days ").await.unwrap(), "# Lisbon");
        let seen = provider.seen_messages(0);
        assert_eq!(seen[1].content, "Lisbon for 2 days");
    }

    #[tokio::test]
    async fn reasoning_failure_is_not_input_error() {
        let planner = planner(Arc::new(ScriptedProvider::new(vec![])));

        let err = planner.submit_query("Rome").await.unwrap_err();
        assert!(!err.is_input_error());
        assert!(matches!(err, QueryError::Agent(AgentError::Reasoning(_))));
    }

    #[tokio::test]
    async fn responses_serialize_to_boundary_shape() {
        let planner = planner(Arc::new(ScriptedProvider::new(vec![ChatResponse::text("ok")])));

        assert_eq!(
            serde_json::to_value(planner.respond("Oslo").await).unwrap(),
            json!({"answer": "ok"})
        );
        assert_eq!(
            serde_json::to_value(planner.respond("").await).unwrap(),
            json!({"error": "Query cannot be empty."})
        );
    }
}
