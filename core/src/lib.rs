pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod planner;
pub mod providers;
pub mod tools;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use agent::{AgentLoop, ContextBuilder, ToolRegistry};
pub use config::*;
pub use error::*;
pub use planner::{QueryRequest, QueryResponse, TravelPlanner};
pub use providers::*;
pub use tools::*;
pub use traits::*;
