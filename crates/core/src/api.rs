//! # Caller API
//!
//! The request/response boundary for the agency pipeline: an inbound
//! project request (the intake form payload, credentials included), and an
//! envelope that reports either the per-stage outputs or a failure with a
//! diagnostic. Structural failures never leak partial stage output.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{GroqBackend, LlmBackend};
use crate::error::PipelineError;
use crate::models::{
    BudgetRange, Credentials, LlmProvider, ModelConfig, PipelineConfig, Priority, ProjectInfo,
    ProjectType, TimelineBucket, DEFAULT_MODEL,
};
use crate::pipeline::{agency_tasks, aggregate_report, Executor, TaskId, TaskResult, TaskStatus};

/// One inbound analysis request, as posted by the intake form.
///
/// Credentials ride on the request; they are scoped to this run and never
/// stored globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub project_name: String,
    pub project_description: String,
    pub project_type: ProjectType,
    pub timeline: TimelineBucket,
    pub budget_range: BudgetRange,
    pub priority: Priority,
    #[serde(default)]
    pub tech_requirements: String,
    #[serde(default)]
    pub special_considerations: String,
    pub groq_api_key: String,
    /// Model override; the default agency model when absent
    #[serde(default)]
    pub model_name: Option<String>,
    /// Provider override; Groq when absent
    #[serde(default)]
    pub provider: LlmProvider,
    /// Base URL override for any OpenAI-compatible endpoint
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProjectRequest {
    fn project_info(&self) -> ProjectInfo {
        ProjectInfo {
            name: self.project_name.clone(),
            description: self.project_description.clone(),
            project_type: self.project_type,
            timeline: self.timeline,
            budget: self.budget_range,
            priority: self.priority,
            technical_requirements: self.tech_requirements.clone(),
            special_considerations: self.special_considerations.clone(),
        }
    }

    fn model_config(&self) -> ModelConfig {
        let mut model = ModelConfig::new(self.model_name.as_deref().unwrap_or(DEFAULT_MODEL));
        model.provider = self.provider.clone();
        model.base_url = self.base_url.clone();
        model
    }
}

/// Output of one stage: its terminal status, the agent's raw text (kept
/// even when validation failed), the validated structured payload when the
/// stage required one, and the captured error on failure. A stage skipped
/// by an abort stays `Pending` with empty output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    pub status: TaskStatus,
    pub raw_output: String,
    pub structured_output: Option<Value>,
    pub error: Option<String>,
}

impl StageOutput {
    fn from_result(result: Option<&TaskResult>) -> Self {
        match result {
            Some(result) => Self {
                status: result.status,
                raw_output: result.raw_text.clone(),
                structured_output: result.structured.clone(),
                error: result.error.clone(),
            },
            None => Self {
                status: TaskStatus::Pending,
                raw_output: String::new(),
                structured_output: None,
                error: None,
            },
        }
    }
}

/// Per-stage outputs of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ceo: StageOutput,
    pub cto: StageOutput,
    pub pm: StageOutput,
    pub dev: StageOutput,
    pub client: StageOutput,
    /// The run-level aggregate: the final stage's textual output
    pub aggregate: Option<String>,
}

impl AnalysisResult {
    fn from_results(results: &BTreeMap<TaskId, TaskResult>) -> Self {
        let stage = |id: &str| StageOutput::from_result(results.get(&TaskId::new(id)));
        Self {
            ceo: stage("ceo"),
            cto: stage("cto"),
            pm: stage("pm"),
            dev: stage("dev"),
            client: stage("client"),
            aggregate: aggregate_report(results),
        }
    }
}

/// The response envelope returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Success {
        success: bool,
        result: AnalysisResult,
    },
    Failure {
        success: bool,
        error: String,
        diagnostic: String,
    },
}

impl AnalysisResponse {
    fn success(result: AnalysisResult) -> Self {
        Self::Success {
            success: true,
            result,
        }
    }

    fn failure(error: &PipelineError) -> Self {
        Self::Failure {
            success: false,
            error: error.to_string(),
            diagnostic: format!("{error:?}"),
        }
    }
}

/// Run the full agency pipeline for one request against a Groq-compatible
/// endpoint built from the request's credentials.
pub async fn run_project_analysis(request: &ProjectRequest) -> AnalysisResponse {
    let credentials = Credentials::new(&request.groq_api_key);
    let backend = match GroqBackend::for_model(&credentials, &request.model_config()) {
        Ok(backend) => Arc::new(backend),
        Err(error) => return AnalysisResponse::failure(&error),
    };
    run_with_backend(request, backend).await
}

/// Same as [`run_project_analysis`] but against a caller-supplied backend.
pub async fn run_with_backend(
    request: &ProjectRequest,
    backend: Arc<dyn LlmBackend>,
) -> AnalysisResponse {
    let config = PipelineConfig::new(&request.groq_api_key);
    let tasks = agency_tasks(&request.project_info(), request.model_config());
    let executor = Executor::new(config, backend);

    match executor.run(&tasks).await {
        Ok(results) => AnalysisResponse::success(AnalysisResult::from_results(&results)),
        Err(error) => {
            tracing::warn!(%error, "project analysis aborted");
            AnalysisResponse::failure(&error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CompletionRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedBackend {
        responses: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<String>) -> Self {
            let mut queue = responses;
            queue.reverse();
            Self {
                responses: Mutex::new(queue),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| PipelineError::BackendUnavailable("script exhausted".to_string()))
        }
    }

    fn request(api_key: &str) -> ProjectRequest {
        ProjectRequest {
            project_name: "Acme Portal".to_string(),
            project_description: "Customer portal".to_string(),
            project_type: ProjectType::WebApplication,
            timeline: TimelineBucket::ThreeToFourMonths,
            budget_range: BudgetRange::TwentyFiveToFifty,
            priority: Priority::High,
            tech_requirements: String::new(),
            special_considerations: String::new(),
            groq_api_key: api_key.to_string(),
            model_name: None,
            provider: LlmProvider::Groq,
            base_url: None,
        }
    }

    fn analysis_response() -> String {
        json!({
            "name": "Acme Portal",
            "analyzed_project_type": "Web Application",
            "complexity": "high",
            "timeline": "6 months",
            "budget_feasibility": "within range",
            "requirements": ["Security"]
        })
        .to_string()
    }

    fn spec_response() -> String {
        json!({
            "project_name": "Acme Portal",
            "architecture": "microservices",
            "technologies": ["rust", "postgres"],
            "scalability": "high"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_blank_key_fails_before_any_backend_call() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let response = run_with_backend(&request("  "), backend.clone()).await;

        match response {
            AnalysisResponse::Failure { success, error, .. } => {
                assert!(!success);
                assert!(error.contains("API key"));
            }
            AnalysisResponse::Success { .. } => panic!("expected failure"),
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_run_produces_stage_outputs_and_aggregate() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            analysis_response(),
            spec_response(),
            "product roadmap".to_string(),
            "implementation plan".to_string(),
            "engagement strategy".to_string(),
        ]));
        let response = run_with_backend(&request("gsk_test"), backend).await;

        let result = match response {
            AnalysisResponse::Success { success, result } => {
                assert!(success);
                result
            }
            AnalysisResponse::Failure { error, .. } => panic!("unexpected failure: {error}"),
        };

        assert_eq!(
            result.ceo.structured_output.as_ref().unwrap()["name"],
            "Acme Portal"
        );
        assert_eq!(
            result.cto.structured_output.as_ref().unwrap()["architecture"],
            "microservices"
        );
        assert_eq!(result.pm.status, TaskStatus::Succeeded);
        assert!(result.pm.structured_output.is_none());
        assert_eq!(result.pm.raw_output, "product roadmap");
        assert_eq!(result.aggregate.as_deref(), Some("engagement strategy"));
    }

    #[tokio::test]
    async fn test_failed_stage_surfaces_status_error_and_raw_text() {
        // cto fails validation on both attempts; the run continues, and the
        // failure stays visible in the stage record.
        let backend = Arc::new(ScriptedBackend::new(vec![
            analysis_response(),
            "not a spec".to_string(),
            "not a spec".to_string(),
            "product roadmap".to_string(),
            "implementation plan".to_string(),
            "engagement strategy".to_string(),
        ]));
        let response = run_with_backend(&request("gsk_test"), backend).await;

        let result = match response {
            AnalysisResponse::Success { result, .. } => result,
            AnalysisResponse::Failure { error, .. } => panic!("unexpected failure: {error}"),
        };
        assert_eq!(result.cto.status, TaskStatus::Failed);
        assert_eq!(result.cto.raw_output, "not a spec");
        assert!(result
            .cto
            .error
            .as_deref()
            .unwrap()
            .contains("TechnicalSpecification"));
        assert!(result.cto.structured_output.is_none());
        assert_eq!(result.aggregate.as_deref(), Some("engagement strategy"));
    }

    #[test]
    fn test_request_deserializes_form_payload() {
        let payload = json!({
            "project_name": "Acme Portal",
            "project_description": "Customer portal",
            "project_type": "Web Application",
            "timeline": "3-4 months",
            "budget_range": "$25k-$50k",
            "priority": "High",
            "groq_api_key": "gsk_test"
        });
        let request: ProjectRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.project_type, ProjectType::WebApplication);
        assert_eq!(request.budget_range, BudgetRange::TwentyFiveToFifty);
        assert!(request.tech_requirements.is_empty());
        assert!(request.model_name.is_none());
        assert_eq!(request.provider, LlmProvider::Groq);
        assert!(request.base_url.is_none());
    }

    #[test]
    fn test_provider_and_base_url_reach_model_config() {
        let payload = json!({
            "project_name": "Acme Portal",
            "project_description": "Customer portal",
            "project_type": "Web Application",
            "timeline": "3-4 months",
            "budget_range": "$25k-$50k",
            "priority": "High",
            "groq_api_key": "sk_test",
            "provider": "openai",
            "base_url": "http://localhost:9000/v1",
            "model_name": "gpt-4o-mini"
        });
        let request: ProjectRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.provider, LlmProvider::OpenAI);

        let model = request.model_config();
        assert_eq!(model.provider, LlmProvider::OpenAI);
        assert_eq!(model.base_url.as_deref(), Some("http://localhost:9000/v1"));
        assert_eq!(model.model, "gpt-4o-mini");
    }

    #[test]
    fn test_response_envelope_shape() {
        let response = AnalysisResponse::failure(&PipelineError::Configuration(
            "API key is missing or blank".to_string(),
        ));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("API key"));
        assert!(value["diagnostic"].as_str().is_some());
    }
}
