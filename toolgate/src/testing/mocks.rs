//! Mock collaborators for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::{FinishInfo, ModelClient, StreamRequest};
use crate::errors::{ModelError, ToolError};
use crate::events::{OutputSink, StreamEvent};
use crate::tools::{ExecutionContext, GatedExecute};

/// A model client that replays a fixed script and records requests.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    chunks: Vec<String>,
    error: Mutex<Option<ModelError>>,
    requests: Mutex<Vec<StreamRequest>>,
}

impl ScriptedModel {
    /// Creates a model that finishes immediately with `stop`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model whose next call fails.
    #[must_use]
    pub fn failing(error: ModelError) -> Self {
        Self {
            error: Mutex::new(Some(error)),
            ..Self::default()
        }
    }

    /// Adds a text chunk to stream.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.chunks.push(text.into());
        self
    }

    /// Returns the requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<StreamRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn stream(
        &self,
        request: StreamRequest,
        sink: Arc<dyn OutputSink>,
    ) -> Result<FinishInfo, ModelError> {
        self.requests.lock().push(request);

        if let Some(error) = self.error.lock().take() {
            return Err(error);
        }

        for chunk in &self.chunks {
            sink.write(StreamEvent::TextDelta {
                text: chunk.clone(),
            });
        }
        sink.write(StreamEvent::Finish {
            finish_reason: "stop".to_string(),
        });

        Ok(FinishInfo::new("stop", 1))
    }
}

/// A gated handler that records calls and returns a fixed value.
#[derive(Debug)]
pub struct RecordingHandler {
    result: serde_json::Value,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingHandler {
    /// Creates a handler returning `result`.
    #[must_use]
    pub fn new(result: serde_json::Value) -> Self {
        Self {
            result,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps before returning.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the number of times the handler ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns `(tool_call_id, args)` for each call.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl GatedExecute for Arc<RecordingHandler> {
    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        self.calls.lock().push((ctx.tool_call_id, args));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.result.clone())
    }
}
