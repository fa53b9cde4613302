//! Message and message part types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// The human user.
    User,
    /// The model.
    Assistant,
    /// Out-of-band data attached to the conversation.
    Data,
}

impl Role {
    /// Returns the role as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Data => "data",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message ID.
    pub id: String,
    /// Who wrote the message.
    pub role: Role,
    /// Free-text content.
    #[serde(default)]
    pub content: String,
    /// When the message was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Ordered parts, when the client sends them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<MessagePart>>,
    /// Fields not modelled here, such as `annotations`, kept as sent.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Creates a message with a fresh ID and the current timestamp.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Some(Utc::now()),
            parts: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Sets the message ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the parts.
    #[must_use]
    pub fn with_parts(mut self, parts: Vec<MessagePart>) -> Self {
        self.parts = Some(parts);
        self
    }

    /// Iterates over the tool invocations carried by this message.
    pub fn tool_invocations(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.parts
            .iter()
            .flatten()
            .filter_map(MessagePart::as_tool_invocation)
    }
}

/// A message part.
///
/// Parts whose `type` is not modelled here are kept as raw JSON and
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessagePart {
    /// A part with a known shape.
    Typed(TypedPart),
    /// Anything else.
    Unknown(serde_json::Value),
}

impl MessagePart {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Typed(TypedPart::Text { text: text.into() })
    }

    /// Creates a tool invocation part.
    #[must_use]
    pub fn tool_invocation(invocation: ToolInvocation) -> Self {
        Self::Typed(TypedPart::ToolInvocation {
            tool_invocation: invocation,
        })
    }

    /// Creates a step boundary part.
    #[must_use]
    pub fn step_start() -> Self {
        Self::Typed(TypedPart::StepStart)
    }

    /// Returns the tool invocation if this is a tool invocation part.
    #[must_use]
    pub fn as_tool_invocation(&self) -> Option<&ToolInvocation> {
        match self {
            Self::Typed(TypedPart::ToolInvocation { tool_invocation }) => Some(tool_invocation),
            _ => None,
        }
    }

    /// Returns true if this is a tool invocation part.
    #[must_use]
    pub fn is_tool_invocation(&self) -> bool {
        self.as_tool_invocation().is_some()
    }
}

/// Message parts with a known shape, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TypedPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Model reasoning.
    Reasoning {
        /// The reasoning text.
        reasoning: String,
        /// Provider-specific reasoning details.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        details: Vec<serde_json::Value>,
    },
    /// A tool call and, eventually, its result.
    #[serde(rename_all = "camelCase")]
    ToolInvocation {
        /// The invocation record.
        tool_invocation: ToolInvocation,
    },
    /// A cited source.
    Source {
        /// The source payload.
        source: serde_json::Value,
    },
    /// An inline file.
    #[serde(rename_all = "camelCase")]
    File {
        /// The MIME type.
        mime_type: String,
        /// Base64 encoded data.
        data: String,
    },
    /// Boundary between model steps.
    StepStart,
}

/// Lifecycle state of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolInvocationState {
    /// Arguments are still streaming in.
    PartialCall,
    /// The call is complete and awaiting a result.
    Call,
    /// A result value is present.
    Result,
}

/// One tool call embedded in a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    /// Lifecycle state.
    pub state: ToolInvocationState,
    /// The model step that produced the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    /// Call identifier, unique within the conversation.
    pub tool_call_id: String,
    /// Tool name.
    pub tool_name: String,
    /// Tool arguments.
    #[serde(default)]
    pub args: serde_json::Value,
    /// Result payload, once `state` is `result`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Unmodelled fields, kept as sent.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ToolInvocation {
    /// Creates an invocation in the `call` state.
    #[must_use]
    pub fn call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        args: serde_json::Value,
    ) -> Self {
        Self {
            state: ToolInvocationState::Call,
            step: None,
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args,
            result: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Moves the invocation to the `result` state with the given value.
    #[must_use]
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.state = ToolInvocationState::Result;
        self.result = Some(result);
        self
    }

    /// Returns the result as a string slice, if it is a JSON string.
    #[must_use]
    pub fn result_str(&self) -> Option<&str> {
        self.result.as_ref().and_then(serde_json::Value::as_str)
    }
}
