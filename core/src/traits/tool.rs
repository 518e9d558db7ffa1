use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Outcome of one tool invocation as handed back to the reasoning model.
///
/// Failures are values, not errors: `error` is populated and `output`
/// carries an error-shaped record with an empty `results` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: impl Into<Value>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            output: json!({ "error": error, "results": [] }),
            error: Some(error),
        }
    }

    /// A failure whose output is an adapter-specific record. The record is
    /// expected to already contain `error` and `results`.
    pub fn failure(record: Value, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: record,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters_schema: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters_schema: self.parameters_schema(),
        }
    }
}
