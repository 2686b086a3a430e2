//! # Tasks and Results
//!
//! A task is one pipeline stage: a bound description, the agent that runs
//! it, declared upstream dependencies, and an optional required output
//! schema. Results are single-assignment: created `Pending`, moved once to
//! a terminal status, never mutated again.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agents::Agent;
use crate::schema::SchemaId;

/// Identifier of a task, unique within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        TaskId::new(id)
    }
}

/// One unit of work in the pipeline. Immutable once the pipeline is
/// defined; dependencies are explicit typed edges, never prompt-embedded
/// references.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    /// Task description, already bound with project fields
    pub description: String,
    /// The agent that will run this task (shared, read-only)
    pub agent: Arc<Agent>,
    /// Upstream dependencies, in declaration order
    pub dependencies: Vec<TaskId>,
    /// Required structured-output contract, if any
    pub output_schema: Option<SchemaId>,
}

impl Task {
    pub fn new(id: &str, description: &str, agent: Arc<Agent>) -> Self {
        Self {
            id: TaskId::new(id),
            description: description.to_string(),
            agent,
            dependencies: Vec::new(),
            output_schema: None,
        }
    }

    pub fn with_dependencies(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(|id| TaskId::new(id)).collect();
        self
    }

    pub fn with_output_schema(mut self, schema: SchemaId) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

/// Status of a task's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
}

/// The recorded outcome of one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    /// The agent's final textual output
    pub raw_text: String,
    /// Validated structured payload, when an output schema was required
    pub structured: Option<Value>,
    /// Schema the structured payload was validated against
    pub schema: Option<SchemaId>,
    pub status: TaskStatus,
    pub error: Option<String>,
}

impl TaskResult {
    pub fn pending(task_id: TaskId) -> Self {
        Self {
            task_id,
            raw_text: String::new(),
            structured: None,
            schema: None,
            status: TaskStatus::Pending,
            error: None,
        }
    }

    pub fn succeeded(
        task_id: TaskId,
        raw_text: String,
        structured: Option<Value>,
        schema: Option<SchemaId>,
    ) -> Self {
        Self {
            task_id,
            raw_text,
            structured,
            schema,
            status: TaskStatus::Succeeded,
            error: None,
        }
    }

    pub fn failed(task_id: TaskId, raw_text: String, error: String) -> Self {
        Self {
            task_id,
            raw_text,
            structured: None,
            schema: None,
            status: TaskStatus::Failed,
            error: Some(error),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != TaskStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definitions;
    use crate::models::ModelConfig;

    #[test]
    fn test_task_builder() {
        let agent = Arc::new(definitions::cto_agent(ModelConfig::default()));
        let task = Task::new("cto", "specify it", agent)
            .with_dependencies(&["ceo"])
            .with_output_schema(SchemaId::TechnicalSpecification);
        assert_eq!(task.id, TaskId::new("cto"));
        assert_eq!(task.dependencies, vec![TaskId::new("ceo")]);
        assert_eq!(task.output_schema, Some(SchemaId::TechnicalSpecification));
    }

    #[test]
    fn test_result_terminal_states() {
        let pending = TaskResult::pending(TaskId::new("ceo"));
        assert!(!pending.is_terminal());

        let failed = TaskResult::failed(TaskId::new("ceo"), String::new(), "boom".to_string());
        assert!(failed.is_terminal());
        assert_eq!(failed.status, TaskStatus::Failed);
        assert!(failed.structured.is_none());
    }
}
