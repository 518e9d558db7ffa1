use crate::agent::{ContextBuilder, ToolRegistry};
use crate::error::AgentError;
use crate::traits::{ChatMessage, ChatRequest, Provider};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Alternates the reasoning step and tool dispatch until the model answers
/// without requesting tools.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    context_builder: ContextBuilder,
    tool_registry: Arc<ToolRegistry>,
    model: String,
    temperature: f64,
    max_iterations: usize,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        context_builder: ContextBuilder,
        tool_registry: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            context_builder,
            tool_registry,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// At least one reasoning step always runs.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub async fn process(&self, query: &str) -> Result<String, AgentError> {
        let mut messages = self.context_builder.build_messages(query);
        self.run(&mut messages).await
    }

    /// Drives the loop over an already seeded conversation. On success the
    /// last message in `messages` is the terminal assistant message.
    pub async fn run(&self, messages: &mut Vec<ChatMessage>) -> Result<String, AgentError> {
        for iteration in 1..=self.max_iterations {
            let reply = self.reason(messages).await?;

            if reply.is_terminal() {
                info!(iteration, "Reasoning produced a final answer");
                let answer = reply.content.clone();
                messages.push(reply);
                return Ok(answer);
            }

            let calls = reply.pending_tool_calls().to_vec();
            debug!(iteration, tool_calls = calls.len(), "Dispatching tool batch");
            messages.push(reply);

            let results = self.tool_registry.dispatch(&calls).await;
            for failed in results.iter().filter(|r| r.result.is_error()) {
                debug!(
                    iteration,
                    tool = %failed.name,
                    id = %failed.tool_call_id,
                    "Tool call returned an error result"
                );
            }
            messages.extend(results.into_iter().map(|r| r.into_message()));
        }

        Err(AgentError::NotConverged {
            max_iterations: self.max_iterations,
        })
    }

    /// One reasoning step: exactly one new assistant message, or a fatal error.
    pub async fn reason(&self, messages: &[ChatMessage]) -> Result<ChatMessage, AgentError> {
        let tools = self.tool_registry.get_specs();
        let request = ChatRequest {
            messages,
            tools: if tools.is_empty() { None } else { Some(tools.as_slice()) },
        };

        let response = self
            .provider
            .chat(request, &self.model, self.temperature)
            .await
            .map_err(AgentError::Reasoning)?;

        if !response.has_tool_calls() && response.text_or_empty().trim().is_empty() {
            return Err(AgentError::EmptyResponse);
        }

        Ok(response.into_message())
    }
}
