//! # Pipeline
//!
//! Dependency-ordered execution of agent tasks. A pipeline is declared as
//! tasks with explicit upstream edges; the executor resolves the order,
//! assembles each task's context from terminal upstream results, and
//! records one terminal result per task.

pub mod context;
pub mod events;
pub mod executor;
pub mod stages;
pub mod task;

pub use context::{ContextAssembler, ContextBundle, ContextSection};
pub use events::{PipelineEvent, PipelineEventKind};
pub use executor::Executor;
pub use stages::{agency_tasks, aggregate_report, STAGE_IDS};
pub use task::{Task, TaskId, TaskResult, TaskStatus};
