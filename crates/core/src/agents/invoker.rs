//! # Agent Invoker
//!
//! Composes the prompt for one task (persona, tool usage, structured-output
//! instructions, upstream context), calls the bound model, and runs the
//! bounded tool-use loop. Every backend call is held to the configured
//! timeout.

use tokio::time::{timeout, Duration};

use super::Agent;
use crate::backend::{CompletionRequest, LlmBackend};
use crate::error::PipelineError;
use crate::models::PipelineConfig;
use crate::schema::{self, records, Schema};
use crate::tools::{self, ToolId};

/// Invokes one agent for one task.
pub struct AgentInvoker<'a> {
    backend: &'a dyn LlmBackend,
    config: &'a PipelineConfig,
}

impl<'a> AgentInvoker<'a> {
    pub fn new(backend: &'a dyn LlmBackend, config: &'a PipelineConfig) -> Self {
        Self { backend, config }
    }

    /// Run the agent to a final textual answer.
    ///
    /// If the model replies with a tool directive (`{"tool": ..,
    /// "arguments": ..}`), the tool is invoked through the registry and its
    /// validated result fed back; at most `max_tool_rounds` rounds. Tool
    /// failures are terminal for the task - the retry budget belongs to
    /// schema validation, not tools.
    pub async fn invoke(
        &self,
        task_id: &str,
        agent: &Agent,
        description: &str,
        context: &str,
        output_schema: Option<&Schema>,
    ) -> Result<String, PipelineError> {
        let system = self.system_prompt(agent, output_schema);
        let mut prompt = String::from(description);
        if !context.is_empty() {
            prompt.push_str("\n\n## Upstream context\n\n");
            prompt.push_str(context);
        }

        let mut rounds = 0;
        loop {
            let response = self.complete(task_id, agent, &system, &prompt).await?;

            let directive = if agent.tools.is_empty() {
                None
            } else {
                parse_tool_directive(&response)
            };
            let (tool_name, args) = match directive {
                Some(directive) => directive,
                None => return Ok(response),
            };

            if rounds >= self.config.max_tool_rounds {
                tracing::warn!(task = task_id, "tool round budget exhausted");
                return Ok(response);
            }
            rounds += 1;

            let tool_id = ToolId::parse(&tool_name).ok_or_else(|| PipelineError::Tool {
                tool: tool_name.clone(),
                reason: "unknown tool".to_string(),
            })?;
            if !agent.allows(tool_id) {
                return Err(PipelineError::Tool {
                    tool: tool_name,
                    reason: format!("not in agent '{}' allowed set", agent.id),
                });
            }

            let result = tools::invoke(tool_id, &args)?;
            tracing::debug!(task = task_id, tool = %tool_id, "tool invoked");
            prompt.push_str(&format!(
                "\n\nTool `{}` returned:\n{}\n\nUse this result to produce your final answer.",
                tool_id,
                schema::canonical_string(&result, None),
            ));
        }
    }

    async fn complete(
        &self,
        task_id: &str,
        agent: &Agent,
        system: &str,
        prompt: &str,
    ) -> Result<String, PipelineError> {
        let request = CompletionRequest {
            system: system.to_string(),
            prompt: prompt.to_string(),
            model: agent.model.model.clone(),
            temperature: agent.model.temperature,
        };
        timeout(
            Duration::from_secs(self.config.task_timeout_secs),
            self.backend.complete(request),
        )
        .await
        .map_err(|_| PipelineError::Timeout {
            task: task_id.to_string(),
            seconds: self.config.task_timeout_secs,
        })?
    }

    fn system_prompt(&self, agent: &Agent, output_schema: Option<&Schema>) -> String {
        let mut system = agent.persona.trim_end().to_string();

        if !agent.tools.is_empty() {
            system.push_str(
                "\n\n## Tools\n\nTo invoke a tool, reply with a single JSON object:\n\
                 {\"tool\": \"<tool name>\", \"arguments\": { ... }}\n\nAvailable tools:\n",
            );
            system.push_str(&tools::usage_block(&agent.tools));
        }

        if let Some(schema) = output_schema {
            system.push_str(&format!(
                "\n\n## Output format\n\nYour final answer must be a single JSON object \
                 conforming to the `{}` schema:\n",
                schema.name
            ));
            if let Some(json_schema) = records::json_schema(schema.id) {
                system.push_str(&schema::canonical_string(&json_schema, None));
                system.push('\n');
            }
        }

        system
    }
}

/// Detect a tool directive in a model reply.
fn parse_tool_directive(response: &str) -> Option<(String, serde_json::Value)> {
    let value = schema::extract_json(response)?;
    let tool = value.get("tool")?.as_str()?.to_string();
    let args = value.get("arguments").cloned()?;
    Some((tool, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::definitions;
    use crate::models::ModelConfig;
    use crate::schema::SchemaId;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Backend that replays scripted responses and records prompts.
    struct ScriptedBackend {
        responses: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<&str>) -> Self {
            let mut queue: Vec<String> = responses.into_iter().map(String::from).collect();
            queue.reverse();
            Self {
                responses: Mutex::new(queue),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String, PipelineError> {
            self.prompts.lock().unwrap().push(request.prompt);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| PipelineError::BackendUnavailable("script exhausted".to_string()))
        }
    }

    #[tokio::test]
    async fn test_plain_completion_passes_through() {
        let backend = ScriptedBackend::new(vec!["a roadmap"]);
        let config = PipelineConfig::new("gsk_test");
        let invoker = AgentInvoker::new(&backend, &config);
        let agent = definitions::pm_agent(ModelConfig::default());

        let out = invoker
            .invoke("pm", &agent, "plan it", "", None)
            .await
            .unwrap();
        assert_eq!(out, "a roadmap");
    }

    #[tokio::test]
    async fn test_tool_round_feeds_result_back() {
        let directive = json!({
            "tool": "analyze_project_requirements",
            "arguments": {
                "project_name": "Acme Portal",
                "project_description": "portal",
                "project_type": "Web Application",
                "budget_range": "$25k-$50k"
            }
        })
        .to_string();
        let backend = ScriptedBackend::new(vec![&directive, "final summary"]);
        let config = PipelineConfig::new("gsk_test");
        let invoker = AgentInvoker::new(&backend, &config);
        let agent = definitions::ceo_agent(ModelConfig::default());

        let out = invoker
            .invoke("ceo", &agent, "analyze", "", None)
            .await
            .unwrap();
        assert_eq!(out, "final summary");

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Tool `analyze_project_requirements` returned"));
        assert!(prompts[1].contains("Acme Portal"));
    }

    #[tokio::test]
    async fn test_bad_tool_arguments_fail_without_retry() {
        let directive = json!({
            "tool": "analyze_project_requirements",
            "arguments": {"project_name": "Acme Portal"}
        })
        .to_string();
        let backend = ScriptedBackend::new(vec![&directive]);
        let config = PipelineConfig::new("gsk_test");
        let invoker = AgentInvoker::new(&backend, &config);
        let agent = definitions::ceo_agent(ModelConfig::default());

        let err = invoker
            .invoke("ceo", &agent, "analyze", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ToolArgument { .. }));
        // The script held only one response; no second call was made.
        assert!(backend.responses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disallowed_tool_rejected() {
        let directive = json!({
            "tool": "create_technical_specification",
            "arguments": {}
        })
        .to_string();
        let backend = ScriptedBackend::new(vec![&directive]);
        let config = PipelineConfig::new("gsk_test");
        let invoker = AgentInvoker::new(&backend, &config);
        let agent = definitions::ceo_agent(ModelConfig::default());

        let err = invoker
            .invoke("ceo", &agent, "analyze", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Tool { .. }));
    }

    #[tokio::test]
    async fn test_system_prompt_embeds_output_schema() {
        let backend = ScriptedBackend::new(vec![]);
        let config = PipelineConfig::new("gsk_test");
        let invoker = AgentInvoker::new(&backend, &config);
        let agent = definitions::cto_agent(ModelConfig::default());

        let system =
            invoker.system_prompt(&agent, Some(schema::get(SchemaId::TechnicalSpecification)));
        assert!(system.contains("TechnicalSpecification"));
        assert!(system.contains("create_technical_specification"));
    }
}
