//! Events written to the client-facing output stream.

use serde::{Deserialize, Serialize};

/// An event on the outbound stream.
///
/// Serialized with a `kind` tag, e.g.
/// `{"kind":"tool_result","toolCallId":"call_1","result":"42"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A chunk of model text.
    TextDelta {
        /// The text chunk.
        text: String,
    },
    /// The model requested a tool call.
    #[serde(rename_all = "camelCase")]
    ToolCall {
        /// Call identifier.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Tool arguments.
        args: serde_json::Value,
    },
    /// A tool call was resolved.
    #[serde(rename_all = "camelCase")]
    ToolResult {
        /// Call identifier the result belongs to.
        tool_call_id: String,
        /// Result payload.
        result: serde_json::Value,
    },
    /// The stream hit an error.
    Error {
        /// Error message.
        message: String,
    },
    /// The model finished.
    #[serde(rename_all = "camelCase")]
    Finish {
        /// Why the model stopped.
        finish_reason: String,
    },
}

impl StreamEvent {
    /// Creates a tool result event.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            result,
        }
    }

    /// Creates an error event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns the serialized `kind` of the event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextDelta { .. } => "text_delta",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Error { .. } => "error",
            Self::Finish { .. } => "finish",
        }
    }

    /// Returns the call identifier for tool events.
    #[must_use]
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::ToolCall { tool_call_id, .. } | Self::ToolResult { tool_call_id, .. } => {
                Some(tool_call_id)
            }
            _ => None,
        }
    }
}
