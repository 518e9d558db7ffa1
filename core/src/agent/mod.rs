pub mod context;
pub mod loop_;
pub mod registry;

pub use context::ContextBuilder;
pub use loop_::AgentLoop;
pub use registry::{ToolCallResult, ToolRegistry};
