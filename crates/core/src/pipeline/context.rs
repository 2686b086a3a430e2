//! # Context Assembler
//!
//! Builds the material injected into a task's prompt from its completed
//! upstream tasks. Sections follow dependency-declaration order, structured
//! payloads are rendered canonically, and a failed upstream is marked
//! explicitly rather than omitted - downstream agents see degraded input,
//! never silently missing input.

use std::collections::BTreeMap;

use crate::error::PipelineError;
use crate::schema;

use super::task::{Task, TaskId, TaskResult, TaskStatus};

/// One upstream contribution, tagged with its source task.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSection {
    pub task_id: TaskId,
    pub body: String,
    /// False when the upstream task failed and only a marker is present
    pub available: bool,
}

/// The assembled upstream material for one task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextBundle {
    pub sections: Vec<ContextSection>,
}

impl ContextBundle {
    /// Render the bundle as prompt text. Deterministic: same terminal
    /// result map, byte-identical output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&format!(
                "### Output of task '{}'\n{}\n",
                section.task_id, section.body
            ));
        }
        out
    }
}

/// Assembles context bundles from terminal task results.
pub struct ContextAssembler;

impl ContextAssembler {
    /// Build the context for `task` from the result map.
    ///
    /// Succeeded dependencies contribute their structured payload in
    /// canonical form (raw text as fallback); failed dependencies
    /// contribute an explicit unavailable marker. A pending or missing
    /// dependency is a programming error.
    pub fn build(
        task: &Task,
        results: &BTreeMap<TaskId, TaskResult>,
    ) -> Result<ContextBundle, PipelineError> {
        let mut sections = Vec::with_capacity(task.dependencies.len());

        for dependency in &task.dependencies {
            let result = results
                .get(dependency)
                .ok_or_else(|| PipelineError::DependencyNotReady {
                    task: task.id.to_string(),
                    dependency: dependency.to_string(),
                })?;

            if !result.is_terminal() {
                return Err(PipelineError::DependencyNotReady {
                    task: task.id.to_string(),
                    dependency: dependency.to_string(),
                });
            }

            if result.status == TaskStatus::Failed {
                sections.push(ContextSection {
                    task_id: dependency.clone(),
                    body: format!(
                        "[unavailable: upstream task '{}' failed: {}]",
                        dependency,
                        result.error.as_deref().unwrap_or("unknown error")
                    ),
                    available: false,
                });
            } else {
                let body = match &result.structured {
                    Some(payload) => {
                        let contract = result.schema.map(schema::get);
                        schema::canonical_string(payload, contract)
                    }
                    None => result.raw_text.clone(),
                };
                sections.push(ContextSection {
                    task_id: dependency.clone(),
                    body,
                    available: true,
                });
            }
        }

        Ok(ContextBundle { sections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definitions;
    use crate::models::ModelConfig;
    use crate::schema::SchemaId;
    use serde_json::json;
    use std::sync::Arc;

    fn task_with_deps(id: &str, deps: &[&str]) -> Task {
        let agent = Arc::new(definitions::pm_agent(ModelConfig::default()));
        Task::new(id, "desc", agent).with_dependencies(deps)
    }

    fn succeeded_structured(id: &str) -> TaskResult {
        TaskResult::succeeded(
            TaskId::new(id),
            "summary text".to_string(),
            Some(json!({
                "name": "Acme Portal",
                "analyzed_project_type": "Web Application",
                "complexity": "high",
                "timeline": "6 months",
                "budget_feasibility": "within range",
                "requirements": ["Security"]
            })),
            Some(SchemaId::ProjectAnalysis),
        )
    }

    #[test]
    fn test_sections_follow_declaration_order() {
        let task = task_with_deps("pm", &["ceo", "cto"]);
        let mut results = BTreeMap::new();
        // Insertion order deliberately reversed
        results.insert(
            TaskId::new("cto"),
            TaskResult::succeeded(TaskId::new("cto"), "spec text".to_string(), None, None),
        );
        results.insert(TaskId::new("ceo"), succeeded_structured("ceo"));

        let bundle = ContextAssembler::build(&task, &results).unwrap();
        assert_eq!(bundle.sections[0].task_id, TaskId::new("ceo"));
        assert_eq!(bundle.sections[1].task_id, TaskId::new("cto"));
    }

    #[test]
    fn test_structured_payload_rendered_canonically() {
        let task = task_with_deps("cto", &["ceo"]);
        let mut results = BTreeMap::new();
        results.insert(TaskId::new("ceo"), succeeded_structured("ceo"));

        let bundle = ContextAssembler::build(&task, &results).unwrap();
        // Schema field order, not summary text
        assert!(bundle.sections[0].body.starts_with("{\"name\": \"Acme Portal\""));
        assert!(bundle.sections[0].body.contains("\"analyzed_project_type\""));
    }

    #[test]
    fn test_raw_text_fallback_without_structured_payload() {
        let task = task_with_deps("dev", &["pm"]);
        let mut results = BTreeMap::new();
        results.insert(
            TaskId::new("pm"),
            TaskResult::succeeded(TaskId::new("pm"), "roadmap".to_string(), None, None),
        );

        let bundle = ContextAssembler::build(&task, &results).unwrap();
        assert_eq!(bundle.sections[0].body, "roadmap");
    }

    #[test]
    fn test_failed_dependency_marked_not_omitted() {
        let task = task_with_deps("pm", &["ceo", "cto"]);
        let mut results = BTreeMap::new();
        results.insert(TaskId::new("ceo"), succeeded_structured("ceo"));
        results.insert(
            TaskId::new("cto"),
            TaskResult::failed(
                TaskId::new("cto"),
                String::new(),
                "schema validation failed".to_string(),
            ),
        );

        let bundle = ContextAssembler::build(&task, &results).unwrap();
        assert_eq!(bundle.sections.len(), 2);
        assert!(!bundle.sections[1].available);
        assert!(bundle.sections[1].body.contains("upstream task 'cto' failed"));
    }

    #[test]
    fn test_pending_dependency_is_an_error() {
        let task = task_with_deps("cto", &["ceo"]);
        let mut results = BTreeMap::new();
        results.insert(TaskId::new("ceo"), TaskResult::pending(TaskId::new("ceo")));

        let err = ContextAssembler::build(&task, &results).unwrap_err();
        assert!(matches!(err, PipelineError::DependencyNotReady { .. }));
    }

    #[test]
    fn test_context_isolation() {
        // A result the task does not depend on never appears in its bundle.
        let task = task_with_deps("cto", &["ceo"]);
        let mut results = BTreeMap::new();
        results.insert(TaskId::new("ceo"), succeeded_structured("ceo"));
        results.insert(
            TaskId::new("unrelated"),
            TaskResult::succeeded(
                TaskId::new("unrelated"),
                "should not leak".to_string(),
                None,
                None,
            ),
        );

        let bundle = ContextAssembler::build(&task, &results).unwrap();
        assert_eq!(bundle.sections.len(), 1);
        assert!(!bundle.render().contains("should not leak"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let task = task_with_deps("pm", &["ceo", "cto"]);
        let mut results = BTreeMap::new();
        results.insert(TaskId::new("ceo"), succeeded_structured("ceo"));
        results.insert(
            TaskId::new("cto"),
            TaskResult::succeeded(TaskId::new("cto"), "spec text".to_string(), None, None),
        );

        let first = ContextAssembler::build(&task, &results).unwrap().render();
        let second = ContextAssembler::build(&task, &results).unwrap().render();
        assert_eq!(first, second);
    }
}
