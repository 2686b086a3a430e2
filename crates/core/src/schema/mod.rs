//! # Schema Registry
//!
//! Named structured-output contracts. A [`Schema`] is an ordered set of
//! typed fields; stages and tools reference schemas by [`SchemaId`] and the
//! registry resolves them. The closed set keeps dispatch static - no runtime
//! type inspection.

pub mod records;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use records::{Architecture, ProjectAnalysis, Scalability, TechnicalSpecification};
pub use validate::{canonical_string, coerce_text, extract_json, validate};

/// Identifier for a registered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaId {
    /// CEO stage output: structured project analysis
    ProjectAnalysis,
    /// CTO stage output: structured technical specification
    TechnicalSpecification,
    /// Argument contract for the analyze-project tool
    AnalyzeProjectArgs,
    /// Argument contract for the technical-specification tool
    TechnicalSpecArgs,
}

/// The type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Text restricted to a closed set of allowed values (case-sensitive)
    Enum(&'static [&'static str]),
    /// A sequence of strings
    TextList { non_empty: bool },
}

/// One typed field of a schema, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// A named structured-output contract.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub id: SchemaId,
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Resolve a schema from the closed registry.
pub fn get(id: SchemaId) -> &'static Schema {
    match id {
        SchemaId::ProjectAnalysis => &records::PROJECT_ANALYSIS,
        SchemaId::TechnicalSpecification => &records::TECHNICAL_SPECIFICATION,
        SchemaId::AnalyzeProjectArgs => &records::ANALYZE_PROJECT_ARGS,
        SchemaId::TechnicalSpecArgs => &records::TECHNICAL_SPEC_ARGS,
    }
}
