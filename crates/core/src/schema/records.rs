//! # Structured Records
//!
//! Typed records behind the registered schemas, plus the static field
//! contracts the validator enforces. The `JsonSchema` derives feed the
//! structured-output instructions embedded in agent prompts, so the schema
//! the model sees is generated from the same types the pipeline decodes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{FieldKind, FieldSpec, Schema, SchemaId};

/// Allowed architecture choices for a technical specification.
pub const ARCHITECTURES: &[&str] = &["monolithic", "microservices", "serverless", "hybrid"];

/// Allowed scalability levels.
pub const SCALABILITY_LEVELS: &[&str] = &["high", "medium", "low"];

/// Project categories offered by the intake form.
pub const PROJECT_TYPES: &[&str] = &[
    "Web Application",
    "Mobile App",
    "API Development",
    "Data Analytics",
    "AI/ML Solution",
    "Other",
];

/// Budget buckets offered by the intake form.
pub const BUDGET_RANGES: &[&str] = &["$10k-$25k", "$25k-$50k", "$50k-$100k", "$100k+"];

/// Structured project analysis produced by the CEO stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectAnalysis {
    /// Name of the project
    pub name: String,
    /// Type of project as assessed by the analysis
    pub analyzed_project_type: String,
    /// Assessed complexity of the project
    pub complexity: String,
    /// Estimated timeline for the project
    pub timeline: String,
    /// Assessment of budget feasibility
    pub budget_feasibility: String,
    /// Key requirements identified
    pub requirements: Vec<String>,
}

/// Proposed architecture type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Monolithic,
    Microservices,
    Serverless,
    Hybrid,
}

/// Scalability needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scalability {
    High,
    Medium,
    Low,
}

/// Structured technical specification produced by the CTO stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TechnicalSpecification {
    /// Name of the project
    pub project_name: String,
    /// Proposed architecture type
    pub architecture: Architecture,
    /// Main technologies and frameworks
    pub technologies: Vec<String>,
    /// Scalability needs
    pub scalability: Scalability,
}

pub(super) static PROJECT_ANALYSIS: Schema = Schema {
    id: SchemaId::ProjectAnalysis,
    name: "ProjectAnalysis",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "analyzed_project_type",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "complexity",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "timeline",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "budget_feasibility",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "requirements",
            kind: FieldKind::TextList { non_empty: false },
            required: true,
        },
    ],
};

pub(super) static TECHNICAL_SPECIFICATION: Schema = Schema {
    id: SchemaId::TechnicalSpecification,
    name: "TechnicalSpecification",
    fields: &[
        FieldSpec {
            name: "project_name",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "architecture",
            kind: FieldKind::Enum(ARCHITECTURES),
            required: true,
        },
        FieldSpec {
            name: "technologies",
            kind: FieldKind::TextList { non_empty: true },
            required: true,
        },
        FieldSpec {
            name: "scalability",
            kind: FieldKind::Enum(SCALABILITY_LEVELS),
            required: true,
        },
    ],
};

pub(super) static ANALYZE_PROJECT_ARGS: Schema = Schema {
    id: SchemaId::AnalyzeProjectArgs,
    name: "AnalyzeProjectArgs",
    fields: &[
        FieldSpec {
            name: "project_name",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "project_description",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "project_type",
            kind: FieldKind::Enum(PROJECT_TYPES),
            required: true,
        },
        FieldSpec {
            name: "budget_range",
            kind: FieldKind::Enum(BUDGET_RANGES),
            required: true,
        },
    ],
};

pub(super) static TECHNICAL_SPEC_ARGS: Schema = Schema {
    id: SchemaId::TechnicalSpecArgs,
    name: "TechnicalSpecArgs",
    fields: &[
        FieldSpec {
            name: "project_analysis_json",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "architecture_type",
            kind: FieldKind::Enum(ARCHITECTURES),
            required: true,
        },
        FieldSpec {
            name: "core_technologies",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "scalability_requirements",
            kind: FieldKind::Enum(SCALABILITY_LEVELS),
            required: true,
        },
    ],
};

/// Generated JSON schema for the typed record behind an output contract,
/// embedded in prompts so the model sees the exact shape the pipeline will
/// decode. Tool argument contracts are documented separately via their
/// field specs.
pub fn json_schema(id: SchemaId) -> Option<serde_json::Value> {
    let schema = match id {
        SchemaId::ProjectAnalysis => schemars::schema_for!(ProjectAnalysis),
        SchemaId::TechnicalSpecification => schemars::schema_for!(TechnicalSpecification),
        SchemaId::AnalyzeProjectArgs | SchemaId::TechnicalSpecArgs => return None,
    };
    serde_json::to_value(schema).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_round_trip() {
        let json = serde_json::to_string(&Architecture::Microservices).unwrap();
        assert_eq!(json, "\"microservices\"");
        let back: Architecture = serde_json::from_str("\"hybrid\"").unwrap();
        assert_eq!(back, Architecture::Hybrid);
    }

    #[test]
    fn test_analysis_decodes_from_schema_shaped_value() {
        let value = serde_json::json!({
            "name": "Acme Portal",
            "analyzed_project_type": "Web Application",
            "complexity": "high",
            "timeline": "6 months",
            "budget_feasibility": "within range",
            "requirements": ["Scalable architecture", "Security"]
        });
        let analysis: ProjectAnalysis = serde_json::from_value(value).unwrap();
        assert_eq!(analysis.analyzed_project_type, "Web Application");
        assert_eq!(analysis.requirements.len(), 2);
    }

    #[test]
    fn test_json_schema_only_for_output_records() {
        assert!(json_schema(SchemaId::ProjectAnalysis).is_some());
        assert!(json_schema(SchemaId::TechnicalSpecification).is_some());
        assert!(json_schema(SchemaId::AnalyzeProjectArgs).is_none());
    }
}
