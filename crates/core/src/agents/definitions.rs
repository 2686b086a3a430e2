//! # Agency Agent Definitions
//!
//! Composes the five role-bound agents of the agency. Personas are bundled
//! at compile time; each role runs the same model at a role-specific
//! temperature.

use super::Agent;
use crate::models::ModelConfig;
use crate::tools::ToolId;

/// Project Director persona
pub const CEO: &str = include_str!("defaults/ceo.md");

/// Technical Architect persona
pub const CTO: &str = include_str!("defaults/cto.md");

/// Product Manager persona
pub const PM: &str = include_str!("defaults/pm.md");

/// Lead Developer persona
pub const DEV: &str = include_str!("defaults/dev.md");

/// Client Success Manager persona
pub const CLIENT: &str = include_str!("defaults/client.md");

/// The Project Director (CEO)
///
/// First agent in the chain. Produces the structured project analysis via
/// the analyze tool.
pub fn ceo_agent(model: ModelConfig) -> Agent {
    Agent::new(
        "ceo",
        "Project Director (CEO)",
        CEO,
        model.with_temperature(0.7),
    )
    .with_tool(ToolId::AnalyzeProjectRequirements)
}

/// The Technical Architect (CTO)
///
/// Second agent. Turns the CEO's analysis into a technical specification
/// via the specification tool.
pub fn cto_agent(model: ModelConfig) -> Agent {
    Agent::new(
        "cto",
        "Technical Architect (CTO)",
        CTO,
        model.with_temperature(0.5),
    )
    .with_tool(ToolId::CreateTechnicalSpecification)
}

/// The Product Manager
pub fn pm_agent(model: ModelConfig) -> Agent {
    Agent::new("pm", "Product Manager", PM, model.with_temperature(0.4))
}

/// The Lead Developer
pub fn dev_agent(model: ModelConfig) -> Agent {
    Agent::new("dev", "Lead Developer", DEV, model.with_temperature(0.3))
}

/// The Client Success Manager
pub fn client_agent(model: ModelConfig) -> Agent {
    Agent::new(
        "client",
        "Client Success Manager",
        CLIENT,
        model.with_temperature(0.6),
    )
}
