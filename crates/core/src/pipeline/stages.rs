//! # Agency Stages
//!
//! The five-stage project analysis pipeline: CEO analysis, CTO
//! specification, PM roadmap, Dev implementation plan, and client
//! engagement strategy. Each stage's description is bound once from the
//! project brief; upstream results flow through declared dependencies.

use std::sync::Arc;

use crate::agents::definitions;
use crate::models::{ModelConfig, ProjectInfo};
use crate::schema::SchemaId;

use super::task::{Task, TaskId, TaskResult, TaskStatus};

/// Stage ids, in pipeline order.
pub const STAGE_IDS: [&str; 5] = ["ceo", "cto", "pm", "dev", "client"];

/// Build the five agency tasks for one project brief.
///
/// The same model binding is shared across roles; each role applies its own
/// temperature.
pub fn agency_tasks(project: &ProjectInfo, model: ModelConfig) -> Vec<Task> {
    let summary = project.summary();

    let ceo = Arc::new(definitions::ceo_agent(model.clone()));
    let cto = Arc::new(definitions::cto_agent(model.clone()));
    let pm = Arc::new(definitions::pm_agent(model.clone()));
    let dev = Arc::new(definitions::dev_agent(model.clone()));
    let client = Arc::new(definitions::client_agent(model));

    vec![
        Task::new(
            "ceo",
            &format!(
                "Analyze the following project and produce a structured analysis:\n\
                 Project Name: {}\nProject Description: {}\nProject Type: {}\n\
                 Budget Range: {}\n\
                 Use the analyze_project_requirements tool, then give your final answer \
                 as the structured project analysis.",
                project.name,
                project.description,
                project.project_type.as_str(),
                project.budget.as_str(),
            ),
            ceo,
        )
        .with_output_schema(SchemaId::ProjectAnalysis),
        Task::new(
            "cto",
            "Given the project analysis from the CEO in your context, create a technical \
             specification.\nPass the CEO's analysis as a JSON string to the \
             'project_analysis_json' parameter of the create_technical_specification tool.\n\
             Choose appropriate architecture, core technologies, and scalability \
             requirements based on the analysis, then give your final answer as the \
             structured technical specification.",
            cto,
        )
        .with_dependencies(&["ceo"])
        .with_output_schema(SchemaId::TechnicalSpecification),
        Task::new(
            "pm",
            &format!(
                "Based on project information: {},\nthe CEO's analysis, and the CTO's \
                 technical specification in your context,\ndevelop a high-level product \
                 roadmap and define potential core features, with initial go-to-market \
                 considerations.",
                summary
            ),
            pm,
        )
        .with_dependencies(&["ceo", "cto"]),
        Task::new(
            "dev",
            &format!(
                "Based on project information: {},\nthe CEO's analysis, the CTO's technical \
                 specification, and the PM's roadmap in your context,\nprovide an initial \
                 technical implementation plan, tech stack suggestions, identify challenges, \
                 and estimate effort. Include potential cloud costs.",
                summary
            ),
            dev,
        )
        .with_dependencies(&["ceo", "cto", "pm"]),
        Task::new(
            "client",
            &format!(
                "Based on all project information: {},\nthe CEO's analysis, the CTO's \
                 specification, the PM's roadmap, and the Developer's plan in your context,\n\
                 outline a client engagement and success strategy, including communication, \
                 expectation management, and go-to-market ideas.",
                summary
            ),
            client,
        )
        .with_dependencies(&["ceo", "cto", "pm", "dev"]),
    ]
}

/// The run-level aggregate: the final stage's textual output, when that
/// stage succeeded.
pub fn aggregate_report(
    results: &std::collections::BTreeMap<TaskId, TaskResult>,
) -> Option<String> {
    let last = TaskId::new(STAGE_IDS[STAGE_IDS.len() - 1]);
    results.get(&last).and_then(|result| {
        if result.status == TaskStatus::Succeeded {
            Some(result.raw_text.clone())
        } else {
            None
        }
    })
}
