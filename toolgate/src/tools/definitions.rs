//! Tool definitions and the execute traits.

use crate::errors::ToolError;
use crate::messages::CoreMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// A function the model-streaming layer runs on its own, without approval.
#[async_trait]
pub trait AutoExecute: Send + Sync {
    /// Runs the tool with already validated arguments.
    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// A function that runs only after a human approved the call.
#[async_trait]
pub trait GatedExecute: Send + Sync {
    /// Runs the tool with the call's arguments and conversation context.
    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ExecutionContext,
    ) -> Result<serde_json::Value, ToolError>;
}

/// Context handed to a gated execute function.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// The full conversation, converted to core messages.
    pub messages: Arc<[CoreMessage]>,
    /// The call being executed.
    pub tool_call_id: String,
}

impl ExecutionContext {
    /// Creates a new execution context.
    #[must_use]
    pub fn new(messages: Arc<[CoreMessage]>, tool_call_id: impl Into<String>) -> Self {
        Self {
            messages,
            tool_call_id: tool_call_id.into(),
        }
    }
}

/// Adapter turning an async closure into an [`AutoExecute`].
pub struct AutoExecuteFn<F>(pub F);

#[async_trait]
impl<F, Fut> AutoExecute for AutoExecuteFn<F>
where
    F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, ToolError>> + Send + 'static,
{
    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        (self.0)(args).await
    }
}

/// Adapter turning an async closure into a [`GatedExecute`].
pub struct GatedExecuteFn<F>(pub F);

#[async_trait]
impl<F, Fut> GatedExecute for GatedExecuteFn<F>
where
    F: Fn(serde_json::Value, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, ToolError>> + Send + 'static,
{
    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        (self.0)(args, ctx).await
    }
}

/// Definition of a tool the model may call.
///
/// A definition with an auto-execute function is an "auto" tool and is never
/// gated. Without one the tool is "confirmable": the client asks the user,
/// and the call only runs through the execution registry after approval.
#[derive(Clone)]
pub struct ToolDefinition {
    /// The tool name.
    pub name: String,
    /// Description shown to the model.
    pub description: String,
    /// JSON Schema for the arguments.
    pub parameters: serde_json::Value,
    auto_execute: Option<Arc<dyn AutoExecute>>,
}

impl ToolDefinition {
    /// Creates a new confirmable tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
            auto_execute: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Sets the parameter schema.
    #[must_use]
    pub fn with_parameters(mut self, schema: serde_json::Value) -> Self {
        self.parameters = schema;
        self
    }

    /// Makes this an auto tool.
    #[must_use]
    pub fn with_auto_execute(mut self, execute: impl AutoExecute + 'static) -> Self {
        self.auto_execute = Some(Arc::new(execute));
        self
    }

    /// Makes this an auto tool backed by an async closure.
    #[must_use]
    pub fn with_auto_execute_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, ToolError>> + Send + 'static,
    {
        self.with_auto_execute(AutoExecuteFn(f))
    }

    /// Returns true if the tool runs without approval.
    #[must_use]
    pub fn is_auto_executing(&self) -> bool {
        self.auto_execute.is_some()
    }

    /// Returns the auto-execute function, if any.
    #[must_use]
    pub fn auto_execute(&self) -> Option<&Arc<dyn AutoExecute>> {
        self.auto_execute.as_ref()
    }

    /// Returns what gets advertised to the model.
    #[must_use]
    pub fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("auto_execute", &self.is_auto_executing())
            .finish_non_exhaustive()
    }
}

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// The tool name.
    pub name: String,
    /// Description of what the tool does.
    pub description: String,
    /// JSON Schema for the arguments.
    pub parameters: serde_json::Value,
}
