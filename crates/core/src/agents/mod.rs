//! # Agents
//!
//! A role-bound agent is a policy object: persona, allowed tools, and a
//! model binding. It carries no state beyond its definition and is shared
//! read-only by every task assigned to it.

pub mod definitions;
pub mod invoker;

use serde::{Deserialize, Serialize};

use crate::models::ModelConfig;
use crate::tools::ToolId;

pub use invoker::AgentInvoker;

/// A role-bound agent definition. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identifier, also the stage key in responses ("ceo", "cto", ...)
    pub id: String,
    /// Human-readable role title
    pub role: String,
    /// Persona and goal, used as the system prompt
    pub persona: String,
    /// Tools this agent may invoke
    #[serde(default)]
    pub tools: Vec<ToolId>,
    /// Model binding for this agent
    pub model: ModelConfig,
    /// Whether this agent may delegate to others (unused by the fixed
    /// agency pipeline, kept for parity with the definition record)
    #[serde(default)]
    pub allow_delegation: bool,
}

impl Agent {
    pub fn new(id: &str, role: &str, persona: &str, model: ModelConfig) -> Self {
        Self {
            id: id.to_string(),
            role: role.to_string(),
            persona: persona.to_string(),
            tools: Vec::new(),
            model,
            allow_delegation: false,
        }
    }

    pub fn with_tool(mut self, tool: ToolId) -> Self {
        self.tools.push(tool);
        self
    }

    /// Whether the given tool is in this agent's allowed set.
    pub fn allows(&self, tool: ToolId) -> bool {
        self.tools.contains(&tool)
    }
}
