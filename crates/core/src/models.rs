//! # Agency Models
//!
//! Centralized configuration types for the Agency pipeline: the inbound
//! project record, LLM model bindings, and the per-request `PipelineConfig`
//! that carries credentials and execution policy.
//!
//! Credentials are supplied per request and passed down explicitly; nothing
//! here lives in process-wide mutable state.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Default model used when the request does not override it.
pub const DEFAULT_MODEL: &str = "gemma2-9b-it";

/// Supported LLM providers.
///
/// Groq is the default; OpenAI covers any OpenAI-compatible endpoint via a
/// base URL override.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Groq,
    #[serde(rename = "openai")]
    OpenAI,
}

impl LlmProvider {
    /// Display name for diagnostics
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "Groq",
            LlmProvider::OpenAI => "OpenAI",
        }
    }

    /// Default API base URL for this provider (both are OpenAI-compatible)
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// Configuration for LLM model selection.
///
/// Each agent carries its own binding; the agency runs every role on the
/// same model but with role-specific temperatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// LLM provider to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g. "gemma2-9b-it", "llama3-70b-8192")
    pub model: String,
    /// Sampling temperature for this binding
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Optional base URL override for OpenAI-compatible APIs
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ModelConfig {
    pub fn new(model: &str) -> Self {
        Self {
            provider: LlmProvider::default(),
            model: model.to_string(),
            temperature: default_temperature(),
            base_url: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }
}

/// Per-request credentials for the model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
}

impl Credentials {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
        }
    }

    /// Reject blank keys before any task runs.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.api_key.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "API key is missing or blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// What the executor does when a task fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and keep running; downstream tasks see an explicit
    /// "upstream failed" marker in their context.
    #[default]
    ContinueDegraded,
    /// Stop dispatching further tasks after the first failure.
    AbortOnFailure,
}

/// Per-request pipeline configuration, constructed once per run and passed
/// down to the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Backend credentials for this request
    pub credentials: Credentials,
    /// Abort-vs-continue after a task failure
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Extra agent calls allowed when structured output fails validation
    #[serde(default = "default_validation_retries")]
    pub max_validation_retries: u32,
    /// Upper bound on tool-invocation rounds within one agent call
    #[serde(default = "default_tool_rounds")]
    pub max_tool_rounds: u32,
    /// Timeout for a single backend completion, in seconds
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
}

fn default_validation_retries() -> u32 {
    1
}

fn default_tool_rounds() -> u32 {
    4
}

fn default_task_timeout_secs() -> u64 {
    120
}

impl PipelineConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            credentials: Credentials::new(api_key),
            failure_policy: FailurePolicy::default(),
            max_validation_retries: default_validation_retries(),
            max_tool_rounds: default_tool_rounds(),
            task_timeout_secs: default_task_timeout_secs(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_validation_retries(mut self, retries: u32) -> Self {
        self.max_validation_retries = retries;
        self
    }

    pub fn with_task_timeout_secs(mut self, seconds: u64) -> Self {
        self.task_timeout_secs = seconds;
        self
    }
}

/// Category of project, as offered by the intake form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectType {
    #[serde(rename = "Web Application")]
    WebApplication,
    #[serde(rename = "Mobile App")]
    MobileApp,
    #[serde(rename = "API Development")]
    ApiDevelopment,
    #[serde(rename = "Data Analytics")]
    DataAnalytics,
    #[serde(rename = "AI/ML Solution")]
    AiMlSolution,
    Other,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::WebApplication => "Web Application",
            ProjectType::MobileApp => "Mobile App",
            ProjectType::ApiDevelopment => "API Development",
            ProjectType::DataAnalytics => "Data Analytics",
            ProjectType::AiMlSolution => "AI/ML Solution",
            ProjectType::Other => "Other",
        }
    }
}

/// Expected timeline bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimelineBucket {
    #[serde(rename = "1-2 months")]
    OneToTwoMonths,
    #[serde(rename = "3-4 months")]
    ThreeToFourMonths,
    #[serde(rename = "5-6 months")]
    FiveToSixMonths,
    #[serde(rename = "6+ months")]
    SixPlusMonths,
}

impl TimelineBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineBucket::OneToTwoMonths => "1-2 months",
            TimelineBucket::ThreeToFourMonths => "3-4 months",
            TimelineBucket::FiveToSixMonths => "5-6 months",
            TimelineBucket::SixPlusMonths => "6+ months",
        }
    }
}

/// Budget bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BudgetRange {
    #[serde(rename = "$10k-$25k")]
    TenToTwentyFive,
    #[serde(rename = "$25k-$50k")]
    TwentyFiveToFifty,
    #[serde(rename = "$50k-$100k")]
    FiftyToHundred,
    #[serde(rename = "$100k+")]
    HundredPlus,
}

impl BudgetRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetRange::TenToTwentyFive => "$10k-$25k",
            BudgetRange::TwentyFiveToFifty => "$25k-$50k",
            BudgetRange::FiftyToHundred => "$50k-$100k",
            BudgetRange::HundredPlus => "$100k+",
        }
    }
}

/// Project priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Immutable project brief, created once per request and read-only
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub timeline: TimelineBucket,
    pub budget: BudgetRange,
    pub priority: Priority,
    #[serde(default)]
    pub technical_requirements: String,
    #[serde(default)]
    pub special_considerations: String,
}

impl ProjectInfo {
    /// One-line summary of all fields, quoted to every downstream role the
    /// way the intake record is embedded in stage descriptions.
    pub fn summary(&self) -> String {
        format!(
            "name: {}, description: {}, type: {}, timeline: {}, budget: {}, priority: {}, \
             technical requirements: {}, special considerations: {}",
            self.name,
            self.description,
            self.project_type.as_str(),
            self.timeline.as_str(),
            self.budget.as_str(),
            self.priority.as_str(),
            if self.technical_requirements.is_empty() {
                "none"
            } else {
                &self.technical_requirements
            },
            if self.special_considerations.is_empty() {
                "none"
            } else {
                &self.special_considerations
            },
        )
    }
}
