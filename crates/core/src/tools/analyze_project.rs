//! # Analyze Project Tool
//!
//! Derives a structured [`ProjectAnalysis`] from raw project fields. The
//! handler is a pure transform over validated arguments.

use serde_json::Value;

use super::{ToolDefinition, ToolId};
use crate::error::PipelineError;
use crate::schema::{ProjectAnalysis, SchemaId};

pub(super) static DEFINITION: ToolDefinition = ToolDefinition {
    id: ToolId::AnalyzeProjectRequirements,
    description: "Analyzes project requirements and feasibility, outputting a structured analysis.",
    argument_schema: SchemaId::AnalyzeProjectArgs,
    handler: run,
};

fn run(args: &Value) -> Result<Value, PipelineError> {
    // Arguments are pre-validated against AnalyzeProjectArgs
    let project_name = text_arg(args, "project_name");
    let project_type = text_arg(args, "project_type");

    let analysis = ProjectAnalysis {
        name: project_name,
        analyzed_project_type: project_type,
        complexity: "high".to_string(),
        timeline: "6 months".to_string(),
        budget_feasibility: "within range".to_string(),
        requirements: vec![
            "Scalable architecture".to_string(),
            "Security".to_string(),
            "API integration".to_string(),
        ],
    };

    serde_json::to_value(&analysis).map_err(|e| PipelineError::Tool {
        tool: ToolId::AnalyzeProjectRequirements.as_str().to_string(),
        reason: e.to_string(),
    })
}

pub(super) fn text_arg(args: &Value, name: &str) -> String {
    args.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
