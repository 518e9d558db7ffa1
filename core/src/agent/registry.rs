use crate::error::RegistryError;
use crate::traits::{ChatMessage, Tool, ToolCall, ToolResult, ToolSpec};
use futures_util::future::join_all;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

struct RegisteredTool {
    tool: Arc<dyn Tool>,
    spec: ToolSpec,
    validator: JSONSchema,
}

/// Ordered set of every tool the reasoning model may call.
///
/// Names are unique and schemas are compiled on registration, so contract
/// problems surface while the registry is built. Once shared behind an
/// `Arc` the registry is read-only.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

/// A tool result paired with the call it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub name: String,
    pub result: ToolResult,
}

impl ToolCallResult {
    pub fn into_message(self) -> ChatMessage {
        let content = serde_json::to_string(&self.result)
            .unwrap_or_else(|e| format!("{{\"error\":\"unserializable tool result: {}\"}}", e));
        ChatMessage::tool_result(self.tool_call_id, content)
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tools(
        tools: impl IntoIterator<Item = Box<dyn Tool>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_all(tools)?;
        Ok(registry)
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), RegistryError> {
        let spec = tool.spec();

        if self.contains(&spec.name) {
            return Err(RegistryError::DuplicateTool(spec.name));
        }

        let validator = JSONSchema::compile(&spec.parameters_schema).map_err(|e| {
            RegistryError::InvalidSchema {
                tool: spec.name.clone(),
                reason: e.to_string(),
            }
        })?;

        self.tools.push(RegisteredTool {
            tool: Arc::from(tool),
            spec,
            validator,
        });
        Ok(())
    }

    pub fn register_all(
        &mut self,
        tools: impl IntoIterator<Item = Box<dyn Tool>>,
    ) -> Result<(), RegistryError> {
        for tool in tools {
            self.register(tool)?;
        }
        Ok(())
    }

    pub fn get_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.spec.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.spec.name == name)
    }

    pub async fn execute(&self, name: &str, args: Value) -> ToolResult {
        let Some(entry) = self.find(name) else {
            warn!(tool = %name, "Model requested an unregistered tool");
            return ToolResult::error(format!("Tool '{}' not found", name));
        };

        if let Err(errors) = entry.validator.validate(&args) {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            warn!(tool = %name, errors = ?messages, "Tool arguments rejected by schema");
            return ToolResult::error(format!(
                "Invalid arguments for '{}': {}",
                name,
                messages.join("; ")
            ));
        }

        match entry.tool.execute(args).await {
            Ok(result) => result,
            Err(e) => ToolResult::error(format!("Execution failed: {:#}", e)),
        }
    }

    /// Runs one batch of tool calls concurrently. Results come back in call
    /// order, one per call, each tagged with the id of the call it answers.
    pub async fn dispatch(&self, calls: &[ToolCall]) -> Vec<ToolCallResult> {
        let futures = calls.iter().map(|call| async move {
            debug!(tool = %call.name, id = %call.id, "Dispatching tool call");

            let result = match call.parse_arguments() {
                Ok(args) => self.execute(&call.name, args).await,
                Err(e) => ToolResult::error(format!(
                    "Failed to parse arguments for '{}': {}",
                    call.name, e
                )),
            };

            ToolCallResult {
                tool_call_id: call.id.clone(),
                name: call.name.clone(),
                result,
            }
        });

        join_all(futures).await
    }
}
