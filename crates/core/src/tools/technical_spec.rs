//! # Technical Specification Tool
//!
//! Derives a structured [`TechnicalSpecification`] from a serialized
//! project analysis plus architecture/technology/scalability choices. The
//! upstream analysis JSON is re-validated here; malformed input fails with
//! a descriptive error rather than producing an empty specification.

use serde_json::Value;

use super::{analyze_project::text_arg, ToolDefinition, ToolId};
use crate::error::PipelineError;
use crate::schema::{self, SchemaId};

pub(super) static DEFINITION: ToolDefinition = ToolDefinition {
    id: ToolId::CreateTechnicalSpecification,
    description:
        "Creates technical specifications based on project analysis, outputting a structured specification.",
    argument_schema: SchemaId::TechnicalSpecArgs,
    handler: run,
};

fn run(args: &Value) -> Result<Value, PipelineError> {
    let analysis_json = text_arg(args, "project_analysis_json");

    let analysis: Value = serde_json::from_str(&analysis_json).map_err(|e| {
        PipelineError::ToolArgument {
            tool: ToolId::CreateTechnicalSpecification.as_str().to_string(),
            reason: format!(
                "invalid project_analysis_json: {e}. It must be a valid JSON ProjectAnalysis."
            ),
        }
    })?;
    schema::validate(&analysis, schema::get(SchemaId::ProjectAnalysis)).map_err(|e| {
        PipelineError::ToolArgument {
            tool: ToolId::CreateTechnicalSpecification.as_str().to_string(),
            reason: format!("invalid project_analysis_json: {e}"),
        }
    })?;

    let technologies: Vec<String> = text_arg(args, "core_technologies")
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(serde_json::json!({
        "project_name": analysis["name"],
        "architecture": text_arg(args, "architecture_type"),
        "technologies": technologies,
        "scalability": text_arg(args, "scalability_requirements"),
    }))
}
