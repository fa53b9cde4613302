//! Interface to the language-model streaming call.

use crate::cancellation::CancellationToken;
use crate::errors::ModelError;
use crate::events::OutputSink;
use crate::messages::CoreMessage;
use crate::tools::{ToolRegistry, ToolSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything the model client needs for one streamed response.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Model identifier.
    pub model: String,
    /// System prompt.
    pub system_prompt: String,
    /// Conversation after tool-call processing.
    pub messages: Vec<CoreMessage>,
    /// Tools the model may call. Auto tools are run through
    /// [`ToolRegistry::execute_auto`].
    pub tools: ToolRegistry,
    /// Maximum number of model steps.
    pub max_steps: u32,
    /// Cancellation for the streaming call.
    pub cancel: Option<CancellationToken>,
}

impl StreamRequest {
    /// Returns the tool specs advertised to the model.
    #[must_use]
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools.specs()
    }

    /// Returns true if the caller cancelled the request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// How a streamed response ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishInfo {
    /// Why the model stopped, e.g. `stop` or `tool-calls`.
    pub finish_reason: String,
    /// Number of model steps taken.
    pub steps: u32,
}

impl FinishInfo {
    /// Creates finish info.
    #[must_use]
    pub fn new(finish_reason: impl Into<String>, steps: u32) -> Self {
        Self {
            finish_reason: finish_reason.into(),
            steps,
        }
    }
}

/// A streaming language-model backend.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Streams a response, writing text and tool events to `sink`.
    async fn stream(
        &self,
        request: StreamRequest,
        sink: Arc<dyn OutputSink>,
    ) -> Result<FinishInfo, ModelError>;
}
