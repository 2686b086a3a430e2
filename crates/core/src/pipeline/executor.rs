//! # Pipeline Executor
//!
//! Resolves task order from declared dependencies, invokes each task's
//! agent, enforces schema validation with bounded retry, and collects
//! results into the final result map. Baseline scheduling is strictly
//! sequential in dependency order; independent tasks could be dispatched
//! concurrently as an extension, but correctness never requires it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::agents::AgentInvoker;
use crate::backend::LlmBackend;
use crate::error::PipelineError;
use crate::models::{FailurePolicy, PipelineConfig};
use crate::schema;

use super::context::{ContextAssembler, ContextBundle};
use super::events::{PipelineEvent, PipelineEventKind};
use super::task::{Task, TaskId, TaskResult};

/// Executes a task pipeline against a model backend.
pub struct Executor {
    config: PipelineConfig,
    backend: Arc<dyn LlmBackend>,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl Executor {
    pub fn new(config: PipelineConfig, backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            config,
            backend,
            event_tx: None,
        }
    }

    /// Set event channel for streaming task progress
    pub fn with_event_channel(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run all tasks in dependency order and return the result map.
    ///
    /// Structural problems - invalid graph, unusable credentials - abort
    /// before any task runs. Per-task failures are recorded in the map and
    /// surfaced to dependents via their context; whether the run continues
    /// past a failure is governed by the configured `FailurePolicy`.
    #[tracing::instrument(skip(self, tasks), fields(task_count = tasks.len()))]
    pub async fn run(&self, tasks: &[Task]) -> Result<BTreeMap<TaskId, TaskResult>, PipelineError> {
        self.config.credentials.validate()?;
        let order = topological_order(tasks)?;

        self.emit(PipelineEvent::new(
            PipelineEventKind::PipelineStarted,
            "pipeline",
        ))
        .await;

        let mut results: BTreeMap<TaskId, TaskResult> = BTreeMap::new();
        let mut aborted = false;

        for index in order {
            let task = &tasks[index];
            self.emit(PipelineEvent::new(
                PipelineEventKind::TaskStarted,
                task.id.as_str(),
            ))
            .await;

            let outcome = match ContextAssembler::build(task, &results) {
                Ok(bundle) => self.execute_task(task, &bundle).await,
                Err(error) => Err((String::new(), error)),
            };

            match outcome {
                Ok((raw, structured)) => {
                    tracing::debug!(task = %task.id, "task succeeded");
                    self.emit(PipelineEvent::new(
                        PipelineEventKind::TaskCompleted,
                        task.id.as_str(),
                    ))
                    .await;
                    results.insert(
                        task.id.clone(),
                        TaskResult::succeeded(task.id.clone(), raw, structured, task.output_schema),
                    );
                }
                Err((raw, error)) => {
                    if error.is_structural() {
                        return Err(error);
                    }
                    tracing::warn!(task = %task.id, %error, "task failed");
                    self.emit(
                        PipelineEvent::new(PipelineEventKind::TaskFailed, task.id.as_str())
                            .with_data(serde_json::json!({"error": error.to_string()})),
                    )
                    .await;
                    results.insert(
                        task.id.clone(),
                        TaskResult::failed(task.id.clone(), raw, error.to_string()),
                    );
                    if self.config.failure_policy == FailurePolicy::AbortOnFailure {
                        aborted = true;
                        break;
                    }
                }
            }
        }

        let final_kind = if aborted {
            PipelineEventKind::PipelineFailed
        } else {
            PipelineEventKind::PipelineCompleted
        };
        self.emit(PipelineEvent::new(final_kind, "pipeline")).await;

        Ok(results)
    }

    /// Invoke the task's agent and, when an output schema is required,
    /// coerce the answer - re-invoking with the validation problems appended
    /// up to the configured retry bound. Only schema-shaped failures are
    /// retried.
    async fn execute_task(
        &self,
        task: &Task,
        bundle: &ContextBundle,
    ) -> Result<(String, Option<Value>), (String, PipelineError)> {
        let contract = task.output_schema.map(schema::get);
        let context = bundle.render();
        let invoker = AgentInvoker::new(self.backend.as_ref(), &self.config);

        let mut description = task.description.clone();
        let mut attempt = 0u32;

        loop {
            let raw = invoker
                .invoke(task.id.as_str(), &task.agent, &description, &context, contract)
                .await
                .map_err(|e| (String::new(), e))?;

            let contract = match contract {
                None => return Ok((raw, None)),
                Some(contract) => contract,
            };

            match schema::coerce_text(&raw, contract) {
                Ok(payload) => return Ok((raw, Some(payload))),
                Err(error)
                    if error.is_retryable() && attempt < self.config.max_validation_retries =>
                {
                    attempt += 1;
                    tracing::warn!(task = %task.id, %error, attempt, "validation failed, retrying");
                    self.emit(
                        PipelineEvent::new(PipelineEventKind::ValidationRetry, task.id.as_str())
                            .with_data(serde_json::json!({
                                "attempt": attempt,
                                "error": error.to_string(),
                            })),
                    )
                    .await;
                    description = format!(
                        "{}\n\nYour previous answer was rejected: {}\nAnswer again with a \
                         single JSON object that satisfies the `{}` schema.",
                        task.description, error, contract.name
                    );
                }
                Err(error) => return Err((raw, error)),
            }
        }
    }
}

/// Topological order over the declared tasks, preferring declaration order
/// among ready tasks. Rejects duplicate ids, dependencies on undeclared
/// tasks, and cycles - all before anything runs.
fn topological_order(tasks: &[Task]) -> Result<Vec<usize>, PipelineError> {
    let mut seen: Vec<&TaskId> = Vec::with_capacity(tasks.len());
    for task in tasks {
        if seen.contains(&&task.id) {
            return Err(PipelineError::Cycle(format!(
                "duplicate task id '{}'",
                task.id
            )));
        }
        seen.push(&task.id);
    }
    for task in tasks {
        for dependency in &task.dependencies {
            if !seen.contains(&dependency) {
                return Err(PipelineError::Cycle(format!(
                    "task '{}' depends on undeclared task '{}'",
                    task.id, dependency
                )));
            }
        }
    }

    let mut order = Vec::with_capacity(tasks.len());
    let mut emitted = vec![false; tasks.len()];

    while order.len() < tasks.len() {
        let next = tasks.iter().enumerate().position(|(index, task)| {
            !emitted[index]
                && task.dependencies.iter().all(|dependency| {
                    tasks
                        .iter()
                        .position(|t| &t.id == dependency)
                        .map(|i| emitted[i])
                        .unwrap_or(false)
                })
        });
        match next {
            Some(index) => {
                emitted[index] = true;
                order.push(index);
            }
            None => {
                let stuck: Vec<&str> = tasks
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| !emitted[*index])
                    .map(|(_, task)| task.id.as_str())
                    .collect();
                return Err(PipelineError::Cycle(format!(
                    "dependency cycle among tasks [{}]",
                    stuck.join(", ")
                )));
            }
        }
    }

    Ok(order)
}
