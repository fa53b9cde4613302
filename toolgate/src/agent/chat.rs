//! Per-conversation chat handling.

use super::model::{FinishInfo, ModelClient, StreamRequest};
use crate::cancellation::CancellationToken;
use crate::config::AgentConfig;
use crate::errors::ToolgateError;
use crate::events::{OutputSink, StreamEvent};
use crate::messages::{convert_to_core_messages, Message};
use crate::tools::{ExecutionRegistry, InvocationFailure, ToolCallProcessor, ToolRegistry};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of handling one chat message.
#[derive(Debug)]
pub struct ChatOutcome {
    /// The conversation after tool-call processing.
    pub messages: Vec<Message>,
    /// How the model response ended.
    pub finish: FinishInfo,
}

/// Chat agent that gates tool calls before streaming a model response.
pub struct ChatAgent {
    config: AgentConfig,
    tools: ToolRegistry,
    extra_tools: ToolRegistry,
    executions: ExecutionRegistry,
    model: Arc<dyn ModelClient>,
}

impl ChatAgent {
    /// Creates an agent.
    #[must_use]
    pub fn new(
        config: AgentConfig,
        tools: ToolRegistry,
        executions: ExecutionRegistry,
        model: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            config,
            tools,
            extra_tools: ToolRegistry::new(),
            executions,
            model,
        }
    }

    /// Creates an agent with the Open-Meteo sample tools.
    #[cfg(feature = "open-meteo")]
    pub fn with_default_tools(
        config: AgentConfig,
        model: Arc<dyn ModelClient>,
    ) -> Result<Self, ToolgateError> {
        let (tools, executions) = crate::tools::builtin::default_registries(&config.open_meteo)?;
        Ok(Self::new(config, tools, executions, model))
    }

    /// Adds tools from another source, such as a remote tool server.
    ///
    /// They are advertised to the model alongside the built-in tools and
    /// replace built-ins of the same name. They never go through the
    /// approval gate.
    #[must_use]
    pub fn with_extra_tools(mut self, extra: ToolRegistry) -> Self {
        self.extra_tools = extra;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the tools advertised to the model.
    #[must_use]
    pub fn tools(&self) -> ToolRegistry {
        self.tools.merged(&self.extra_tools)
    }

    /// Called once when the agent starts.
    pub fn on_start(&self) {
        info!(
            model = %self.config.model,
            tool_count = self.tools.len(),
            extra_tool_count = self.extra_tools.len(),
            gated_count = self.executions.gated_tools().count(),
            "Chat agent started"
        );
    }

    /// Called when a client connects.
    pub fn on_connect(&self, connection_id: &str) {
        info!(connection_id, "Client connected");
    }

    /// Handles an incoming chat message.
    ///
    /// Approved and denied tool calls in the last message are finalized
    /// first; the processed conversation then goes to the model.
    ///
    /// If an approved handler fails, each failure is written to the sink as
    /// an error event and the first one is returned. The model is not
    /// called, since the failed calls still hold the approval sentinel
    /// rather than a result.
    pub async fn on_chat_message(
        &self,
        messages: Vec<Message>,
        sink: Arc<dyn OutputSink>,
        cancel: Option<CancellationToken>,
    ) -> Result<ChatOutcome, ToolgateError> {
        if let Some(reason) = cancel.as_ref().and_then(CancellationToken::reason) {
            warn!(reason = %reason, "Chat request cancelled before processing");
            return Err(ToolgateError::Cancelled(reason));
        }

        let processor = ToolCallProcessor::new(self.executions.clone(), Arc::clone(&sink));
        let processed = processor.process(messages).await;
        if let Some(err) = report_failures(processed.failures, sink.as_ref()) {
            return Err(err);
        }

        let request = StreamRequest {
            model: self.config.model.clone(),
            system_prompt: self.config.system_prompt.clone(),
            messages: convert_to_core_messages(&processed.messages),
            tools: self.tools(),
            max_steps: self.config.max_steps,
            cancel,
        };

        match self.model.stream(request, Arc::clone(&sink)).await {
            Ok(finish) => {
                info!(
                    finish_reason = %finish.finish_reason,
                    steps = finish.steps,
                    "Chat response finished"
                );
                Ok(ChatOutcome {
                    messages: processed.messages,
                    finish,
                })
            }
            Err(e) => {
                error!(error = %e, retryable = e.retryable, "Model stream failed");
                sink.write(StreamEvent::error(e.to_string()));
                Err(e.into())
            }
        }
    }
}

fn report_failures(
    failures: Vec<InvocationFailure>,
    sink: &dyn OutputSink,
) -> Option<ToolgateError> {
    let count = failures.len();
    let mut first = None;
    for failure in failures {
        error!(
            tool_call_id = %failure.tool_call_id,
            tool = %failure.tool_name,
            error = %failure.error,
            "Approved tool call failed"
        );
        sink.write(StreamEvent::error(format!(
            "Tool call {} failed: {}",
            failure.tool_call_id, failure.error
        )));
        first.get_or_insert(failure.error);
    }

    if count > 0 {
        warn!(failures = count, "Skipping model call after tool failures");
    }
    first.map(ToolgateError::Tool)
}

impl std::fmt::Debug for ChatAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAgent")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .field("extra_tools", &self.extra_tools)
            .field("executions", &self.executions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ModelError, ToolError};
    use crate::events::CollectingSink;
    use crate::messages::{CoreMessage, MessagePart};
    use crate::testing::{approved_call, ScriptedModel};
    use crate::tools::ToolDefinition;
    use serde_json::json;

    fn registries() -> (ToolRegistry, ExecutionRegistry) {
        let tools = ToolRegistry::builder()
            .tool(ToolDefinition::new("deploy"))
            .build()
            .unwrap();
        let executions = ExecutionRegistry::builder(&tools)
            .handler_fn("deploy", |_args, _ctx| async { Ok(json!("deployed")) })
            .build()
            .unwrap();
        (tools, executions)
    }

    fn agent(model: Arc<ScriptedModel>) -> ChatAgent {
        let (tools, executions) = registries();
        ChatAgent::new(AgentConfig::default().with_max_steps(3), tools, executions, model)
    }

    fn pending_conversation() -> Vec<Message> {
        vec![
            Message::user("deploy please").with_id("m1"),
            Message::assistant("")
                .with_id("m2")
                .with_parts(vec![approved_call("c1", "deploy", json!({}))]),
        ]
    }

    #[tokio::test]
    async fn test_processes_tool_calls_before_streaming() {
        let model = Arc::new(ScriptedModel::new().with_text("Deployed."));
        let sink = Arc::new(CollectingSink::new());

        let outcome = agent(Arc::clone(&model))
            .on_chat_message(pending_conversation(), sink.clone(), None)
            .await
            .unwrap();

        assert_eq!(outcome.finish.finish_reason, "stop");

        // the tool result precedes the model's text
        let kinds: Vec<_> = sink.events().iter().map(StreamEvent::kind).collect();
        assert_eq!(kinds, vec!["tool_result", "text_delta", "finish"]);

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.max_steps, 3);
        assert_eq!(request.tool_specs().len(), 1);
        assert!(request.messages.iter().any(|m| matches!(
            m,
            CoreMessage::Tool { content } if content[0].result == json!("deployed")
        )));
    }

    #[tokio::test]
    async fn test_failed_handler_is_reported_and_model_skipped() {
        let tools = ToolRegistry::builder()
            .tool(ToolDefinition::new("deploy"))
            .build()
            .unwrap();
        let executions = ExecutionRegistry::builder(&tools)
            .handler_fn("deploy", |_args, _ctx| async {
                Err(ToolError::execution_failed("deploy", "cluster unreachable"))
            })
            .build()
            .unwrap();
        let model = Arc::new(ScriptedModel::new().with_text("Deployed."));
        let agent = ChatAgent::new(AgentConfig::default(), tools, executions, model.clone());
        let sink = Arc::new(CollectingSink::new());

        let err = agent
            .on_chat_message(pending_conversation(), sink.clone(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolgateError::Tool(ToolError::ExecutionFailed { .. })));
        assert_eq!(
            sink.events(),
            vec![StreamEvent::error(
                "Tool call c1 failed: Tool execution failed: deploy - cluster unreachable"
            )]
        );
        // the sentinel never reaches the model as a tool result
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_model_error_is_reported_and_returned() {
        let model = Arc::new(ScriptedModel::failing(ModelError::new("upstream 500")));
        let sink = Arc::new(CollectingSink::new());

        let err = agent(model)
            .on_chat_message(vec![Message::user("hi")], sink.clone(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolgateError::Model(_)));
        assert_eq!(
            sink.events(),
            vec![StreamEvent::error("Model stream failed: upstream 500")]
        );
    }

    #[tokio::test]
    async fn test_cancelled_request_short_circuits() {
        let model = Arc::new(ScriptedModel::new());
        let token = CancellationToken::new();
        token.cancel("client closed");

        let err = agent(Arc::clone(&model))
            .on_chat_message(pending_conversation(), Arc::new(CollectingSink::new()), Some(token))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolgateError::Cancelled(reason) if reason == "client closed"));
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_extra_tools_are_advertised() {
        let model = Arc::new(ScriptedModel::new());
        let extra = ToolRegistry::builder()
            .tool(ToolDefinition::new("search").with_auto_execute_fn(|_| async { Ok(json!([])) }))
            .build()
            .unwrap();
        let agent = agent(Arc::clone(&model)).with_extra_tools(extra);
        agent.on_start();
        agent.on_connect("conn-1");

        agent
            .on_chat_message(
                vec![Message::user("hi").with_parts(vec![MessagePart::text("hi")])],
                Arc::new(CollectingSink::new()),
                None,
            )
            .await
            .unwrap();

        let names: Vec<_> = model.requests()[0]
            .tool_specs()
            .into_iter()
            .map(|spec| spec.name)
            .collect();
        assert_eq!(names, vec!["deploy", "search"]);
    }
}
