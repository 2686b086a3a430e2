//! # Pipeline Errors
//!
//! The closed error set for the task pipeline. Structural errors (cycle,
//! missing credentials) abort before any task executes; per-task errors are
//! captured in that task's `TaskResult` rather than raised out of the
//! executor.

use thiserror::Error;

/// Errors produced by the pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The declared task graph is not a DAG, or a task references an
    /// undeclared dependency. Rejected before any task runs.
    #[error("invalid task graph: {0}")]
    Cycle(String),

    /// A task's context was requested before its dependency reached a
    /// terminal status. Internal invariant violation.
    #[error("dependency '{dependency}' of task '{task}' has not completed")]
    DependencyNotReady { task: String, dependency: String },

    /// Model output could not be coerced into the required schema after the
    /// configured retry bound.
    #[error("output does not satisfy schema '{schema}': {problems}")]
    SchemaValidation { schema: String, problems: String },

    /// Tool arguments failed validation against the tool's argument schema.
    /// Never retried.
    #[error("invalid arguments for tool '{tool}': {reason}")]
    ToolArgument { tool: String, reason: String },

    /// A tool handler rejected otherwise well-shaped input.
    #[error("tool '{tool}' failed: {reason}")]
    Tool { tool: String, reason: String },

    /// An agent invocation exceeded the configured task timeout.
    #[error("task '{task}' timed out after {seconds}s")]
    Timeout { task: String, seconds: u64 },

    /// The model backend could not be reached or returned garbage.
    #[error("model backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Missing or invalid per-request configuration (e.g. blank API key).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// Whether this error is recoverable via the bounded validation retry.
    /// Only schema-shaped failures qualify; tool and transport errors are
    /// terminal for the task.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::SchemaValidation { .. })
    }

    /// Whether this error invalidates the whole run rather than one task.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PipelineError::Cycle(_)
                | PipelineError::DependencyNotReady { .. }
                | PipelineError::Configuration(_)
        )
    }
}
