use thiserror::Error;

pub const EMPTY_QUERY_MESSAGE: &str = "Query cannot be empty.";

/// Raised while assembling the tool registry. Never raised at call time.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("tool '{tool}' declares an invalid parameter schema: {reason}")]
    InvalidSchema { tool: String, reason: String },
}

/// Failures that abort the agent loop. Tool failures are never in here:
/// they are folded into the conversation as tool results.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("reasoning step failed: {0:#}")]
    Reasoning(anyhow::Error),

    #[error("reasoning step returned neither text nor tool calls")]
    EmptyResponse,

    #[error("reasoning did not converge after {max_iterations} iterations")]
    NotConverged { max_iterations: usize },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{}", EMPTY_QUERY_MESSAGE)]
    EmptyQuery,

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl QueryError {
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }
}
