//! # Tool Invocation Layer
//!
//! Deterministic, schema-validated transforms an agent may invoke
//! mid-reasoning. Tools form a closed set of tagged variants behind one
//! capability interface, selected by id - no runtime type inspection, no
//! hidden network or model calls.

pub mod analyze_project;
pub mod technical_spec;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PipelineError;
use crate::schema::{self, SchemaId};

/// Identifier for a registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    /// Turn raw project fields into a structured `ProjectAnalysis`
    AnalyzeProjectRequirements,
    /// Turn a serialized analysis plus architecture choices into a
    /// structured `TechnicalSpecification`
    CreateTechnicalSpecification,
}

impl ToolId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::AnalyzeProjectRequirements => "analyze_project_requirements",
            ToolId::CreateTechnicalSpecification => "create_technical_specification",
        }
    }

    pub fn parse(name: &str) -> Option<ToolId> {
        match name {
            "analyze_project_requirements" => Some(ToolId::AnalyzeProjectRequirements),
            "create_technical_specification" => Some(ToolId::CreateTechnicalSpecification),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A callable tool: argument contract plus a pure handler.
#[derive(Clone, Copy)]
pub struct ToolDefinition {
    pub id: ToolId,
    pub description: &'static str,
    pub argument_schema: SchemaId,
    pub handler: fn(&Value) -> Result<Value, PipelineError>,
}

/// Resolve a tool from the closed registry.
pub fn get(id: ToolId) -> &'static ToolDefinition {
    match id {
        ToolId::AnalyzeProjectRequirements => &analyze_project::DEFINITION,
        ToolId::CreateTechnicalSpecification => &technical_spec::DEFINITION,
    }
}

/// Validate arguments against the tool's contract, then run the handler.
///
/// Argument-shape failures surface as `ToolArgumentError` and are never
/// retried; handler failures pass through as tool-specific errors.
pub fn invoke(id: ToolId, args: &Value) -> Result<Value, PipelineError> {
    let tool = get(id);
    let contract = schema::get(tool.argument_schema);
    schema::validate(args, contract).map_err(|e| PipelineError::ToolArgument {
        tool: id.as_str().to_string(),
        reason: e.to_string(),
    })?;
    (tool.handler)(args)
}

/// Human-readable usage block for a set of tools, embedded in the system
/// prompt of any agent that may call them.
pub fn usage_block(tools: &[ToolId]) -> String {
    let mut out = String::new();
    for id in tools {
        let tool = get(*id);
        let contract = schema::get(tool.argument_schema);
        out.push_str(&format!("- `{}`: {}\n  arguments: ", id, tool.description));
        let args: Vec<String> = contract
            .fields
            .iter()
            .map(|field| match field.kind {
                schema::FieldKind::Enum(allowed) => {
                    format!("{} (one of: {})", field.name, allowed.join(", "))
                }
                schema::FieldKind::TextList { .. } => format!("{} (list of strings)", field.name),
                schema::FieldKind::Text => format!("{} (string)", field.name),
            })
            .collect();
        out.push_str(&args.join(", "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_id_round_trip() {
        for id in [
            ToolId::AnalyzeProjectRequirements,
            ToolId::CreateTechnicalSpecification,
        ] {
            assert_eq!(ToolId::parse(id.as_str()), Some(id));
        }
        assert_eq!(ToolId::parse("fetch_web_page"), None);
    }

    #[test]
    fn test_invoke_rejects_bad_args_before_handler() {
        let err = invoke(
            ToolId::AnalyzeProjectRequirements,
            &json!({"project_name": "Acme Portal"}),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ToolArgument { .. }));
    }

    #[test]
    fn test_usage_block_lists_enum_values() {
        let block = usage_block(&[ToolId::CreateTechnicalSpecification]);
        assert!(block.contains("create_technical_specification"));
        assert!(block.contains("monolithic, microservices, serverless, hybrid"));
    }
}
