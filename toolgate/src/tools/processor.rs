//! Tool-call processing over the last message of a conversation.
//!
//! A processing pass looks at every part of the last message, finalizes the
//! gated invocations that carry a fresh approval decision, reports each
//! finalized result on the output sink and splices it back into the part.
//! Everything else, including all earlier messages, comes back untouched.

use super::approval::{resolve_approval, ApprovalDecision};
use super::{ExecutionContext, ExecutionLookup, ExecutionRegistry};
use crate::errors::ToolError;
use crate::events::{OutputSink, StreamEvent};
use crate::messages::{convert_to_core_messages, CoreMessage, Message, MessagePart, ToolInvocation, TypedPart};
use crate::observability::SpanTimer;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result written when the user denies a call.
pub const DENIED_RESULT: &str = "Error: User denied access to tool execution";

/// Result written when an approved tool has no execute function.
pub const NO_EXECUTE_RESULT: &str = "Error: No execute function found on tool";

/// A handler failure for one invocation.
///
/// The invocation's part is left as it was, so the decision is still pending
/// and a later pass will try again.
#[derive(Debug)]
pub struct InvocationFailure {
    /// The call that failed.
    pub tool_call_id: String,
    /// The tool that failed.
    pub tool_name: String,
    /// What went wrong.
    pub error: ToolError,
}

/// Output of a processing pass.
#[derive(Debug, Default)]
pub struct ProcessedConversation {
    /// The conversation with the last message rewritten.
    pub messages: Vec<Message>,
    /// Handlers that failed during the pass.
    pub failures: Vec<InvocationFailure>,
}

impl ProcessedConversation {
    /// Wraps a conversation that needed no changes.
    #[must_use]
    pub fn unchanged(messages: Vec<Message>) -> Self {
        Self {
            messages,
            failures: Vec::new(),
        }
    }

    /// Returns true if no handler failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Discards the failures and returns the messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Finalizes approved and denied tool calls.
#[derive(Clone)]
pub struct ToolCallProcessor {
    executions: ExecutionRegistry,
    sink: Arc<dyn OutputSink>,
}

impl ToolCallProcessor {
    /// Creates a processor over an execution registry and an output sink.
    #[must_use]
    pub fn new(executions: ExecutionRegistry, sink: Arc<dyn OutputSink>) -> Self {
        Self { executions, sink }
    }

    /// Returns the execution registry.
    #[must_use]
    pub fn executions(&self) -> &ExecutionRegistry {
        &self.executions
    }

    /// Runs one processing pass.
    pub async fn process(&self, messages: Vec<Message>) -> ProcessedConversation {
        process_tool_calls(messages, &self.executions, self.sink.as_ref()).await
    }
}

impl std::fmt::Debug for ToolCallProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCallProcessor")
            .field("executions", &self.executions)
            .finish_non_exhaustive()
    }
}

/// Runs one processing pass without building a [`ToolCallProcessor`].
///
/// Parts are handled concurrently on the calling task; the rebuilt last
/// message keeps the input part order whatever order the handlers finish in.
pub async fn process_tool_calls(
    mut messages: Vec<Message>,
    executions: &ExecutionRegistry,
    sink: &dyn OutputSink,
) -> ProcessedConversation {
    let pending = messages.last().map_or(0, |last| {
        last.parts
            .iter()
            .flatten()
            .filter(|part| resolve_approval(part, executions).needs_action())
            .count()
    });
    if pending == 0 {
        return ProcessedConversation::unchanged(messages);
    }

    debug!(pending, message_count = messages.len(), "Processing tool calls");

    let core: Arc<[CoreMessage]> = Arc::from(convert_to_core_messages(&messages));
    let Some(mut last) = messages.pop() else {
        return ProcessedConversation::unchanged(messages);
    };
    let parts = last.parts.take().unwrap_or_default();

    let outcomes = join_all(
        parts
            .into_iter()
            .map(|part| process_part(part, executions, sink, &core)),
    )
    .await;

    let mut failures = Vec::new();
    let parts = outcomes
        .into_iter()
        .map(|(part, failure)| {
            failures.extend(failure);
            part
        })
        .collect();

    last.parts = Some(parts);
    messages.push(last);

    ProcessedConversation { messages, failures }
}

async fn process_part(
    part: MessagePart,
    executions: &ExecutionRegistry,
    sink: &dyn OutputSink,
    core: &Arc<[CoreMessage]>,
) -> (MessagePart, Option<InvocationFailure>) {
    let decision = resolve_approval(&part, executions);
    if !decision.needs_action() {
        return (part, None);
    }

    let invocation = match part {
        MessagePart::Typed(TypedPart::ToolInvocation { tool_invocation }) => tool_invocation,
        other => return (other, None),
    };

    let timer = SpanTimer::start(invocation.tool_name.as_str());
    let outcome = if decision == ApprovalDecision::Denied {
        Ok(serde_json::Value::String(DENIED_RESULT.to_string()))
    } else {
        execute_approved(&invocation, executions, core).await
    };

    match outcome {
        Ok(result) => {
            sink.write(StreamEvent::tool_result(
                invocation.tool_call_id.clone(),
                result.clone(),
            ));
            info!(
                tool = %invocation.tool_name,
                tool_call_id = %invocation.tool_call_id,
                decision = decision.as_str(),
                duration_ms = timer.finish(),
                "Tool invocation finalized"
            );
            (MessagePart::tool_invocation(invocation.with_result(result)), None)
        }
        Err(error) => {
            warn!(
                tool = %invocation.tool_name,
                tool_call_id = %invocation.tool_call_id,
                duration_ms = timer.finish(),
                error = %error,
                "Tool execution failed"
            );
            let failure = InvocationFailure {
                tool_call_id: invocation.tool_call_id.clone(),
                tool_name: invocation.tool_name.clone(),
                error,
            };
            (MessagePart::tool_invocation(invocation), Some(failure))
        }
    }
}

async fn execute_approved(
    invocation: &ToolInvocation,
    executions: &ExecutionRegistry,
    core: &Arc<[CoreMessage]>,
) -> Result<serde_json::Value, ToolError> {
    match executions.lookup(&invocation.tool_name) {
        ExecutionLookup::NotRegistered => {
            warn!(
                tool = %invocation.tool_name,
                tool_call_id = %invocation.tool_call_id,
                "Approved tool has no execute function"
            );
            Ok(serde_json::Value::String(NO_EXECUTE_RESULT.to_string()))
        }
        ExecutionLookup::Registered(handler) => {
            let ctx = ExecutionContext::new(Arc::clone(core), invocation.tool_call_id.as_str());
            handler.execute(invocation.args.clone(), ctx).await
        }
    }
}
