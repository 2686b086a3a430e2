//! # Agency Core
//!
//! The "Brain" of the Agency system - role-specialized agents, the task
//! pipeline that runs them in dependency order, and the structured-output
//! contracts that hold their answers to account.
//!
//! ## Architecture
//!
//! - `agents/` - The five role agents (CEO, CTO, PM, Dev, Client) and the invoker
//! - `pipeline/` - Task graph, context assembly, and the sequential executor
//! - `schema/` - Output contracts, validation, and canonical rendering
//! - `tools/` - Deterministic tools agents may call (closed registry)
//! - `backend/` - The LLM backend trait and the Groq implementation
//! - `api` - Request/response boundary for callers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agency_core::api::{run_project_analysis, ProjectRequest};
//!
//! let request: ProjectRequest = serde_json::from_str(payload)?;
//! let response = run_project_analysis(&request).await;
//! ```

pub mod agents;
pub mod api;
pub mod backend;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod tools;
