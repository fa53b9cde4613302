//! Conversion from UI messages to model-neutral core messages.
//!
//! Gated tool handlers receive the conversation in this form so they never
//! depend on how the client happens to render parts.

use super::{Message, MessagePart, Role, ToolInvocation, ToolInvocationState, TypedPart};
use serde::{Deserialize, Serialize};

/// A model-neutral message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum CoreMessage {
    /// System instructions.
    System {
        /// The text.
        content: String,
    },
    /// User input.
    User {
        /// The text.
        content: String,
    },
    /// Model output for one step.
    Assistant {
        /// Text, reasoning and tool calls in order.
        content: Vec<AssistantContent>,
    },
    /// Results for the tool calls of the preceding assistant step.
    Tool {
        /// One entry per resolved call.
        content: Vec<ToolResultContent>,
    },
}

/// One block of assistant output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AssistantContent {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Reasoning text.
    Reasoning {
        /// The text.
        text: String,
    },
    /// A tool call.
    #[serde(rename_all = "camelCase")]
    ToolCall {
        /// Call identifier.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Tool arguments.
        args: serde_json::Value,
    },
}

/// The result of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultContent {
    /// Call identifier.
    pub tool_call_id: String,
    /// Tool name.
    pub tool_name: String,
    /// Result payload.
    pub result: serde_json::Value,
}

/// Converts UI messages into core messages.
///
/// Assistant messages with parts are split at `step-start` boundaries; each
/// step becomes an assistant message followed by a tool message holding the
/// results of that step's resolved invocations. `data` messages are dropped.
#[must_use]
pub fn convert_to_core_messages(messages: &[Message]) -> Vec<CoreMessage> {
    let mut core = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            Role::System => core.push(CoreMessage::System {
                content: message.content.clone(),
            }),
            Role::User => core.push(CoreMessage::User {
                content: message.content.clone(),
            }),
            Role::Assistant => convert_assistant(message, &mut core),
            Role::Data => {}
        }
    }

    core
}

fn convert_assistant(message: &Message, core: &mut Vec<CoreMessage>) {
    let Some(parts) = message.parts.as_ref() else {
        core.push(CoreMessage::Assistant {
            content: vec![AssistantContent::Text {
                text: message.content.clone(),
            }],
        });
        return;
    };

    let mut step = StepBuffer::default();
    for part in parts {
        match part {
            MessagePart::Typed(TypedPart::StepStart) => step.flush(core),
            MessagePart::Typed(TypedPart::Text { text }) => {
                step.content.push(AssistantContent::Text { text: text.clone() });
            }
            MessagePart::Typed(TypedPart::Reasoning { reasoning, .. }) => {
                step.content.push(AssistantContent::Reasoning {
                    text: reasoning.clone(),
                });
            }
            MessagePart::Typed(TypedPart::ToolInvocation { tool_invocation }) => {
                step.push_invocation(tool_invocation);
            }
            MessagePart::Typed(TypedPart::Source { .. } | TypedPart::File { .. })
            | MessagePart::Unknown(_) => {}
        }
    }
    step.flush(core);
}

#[derive(Default)]
struct StepBuffer {
    content: Vec<AssistantContent>,
    results: Vec<ToolResultContent>,
}

impl StepBuffer {
    fn push_invocation(&mut self, invocation: &ToolInvocation) {
        self.content.push(AssistantContent::ToolCall {
            tool_call_id: invocation.tool_call_id.clone(),
            tool_name: invocation.tool_name.clone(),
            args: invocation.args.clone(),
        });

        if invocation.state == ToolInvocationState::Result {
            if let Some(result) = &invocation.result {
                self.results.push(ToolResultContent {
                    tool_call_id: invocation.tool_call_id.clone(),
                    tool_name: invocation.tool_name.clone(),
                    result: result.clone(),
                });
            }
        }
    }

    fn flush(&mut self, core: &mut Vec<CoreMessage>) {
        if !self.content.is_empty() {
            core.push(CoreMessage::Assistant {
                content: std::mem::take(&mut self.content),
            });
        }
        if !self.results.is_empty() {
            core.push(CoreMessage::Tool {
                content: std::mem::take(&mut self.results),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_plain_messages() {
        let messages = vec![
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
        ];

        let core = convert_to_core_messages(&messages);
        assert_eq!(
            core,
            vec![
                CoreMessage::System {
                    content: "be brief".to_string()
                },
                CoreMessage::User {
                    content: "hi".to_string()
                },
                CoreMessage::Assistant {
                    content: vec![AssistantContent::Text {
                        text: "hello".to_string()
                    }]
                },
            ]
        );
    }

    #[test]
    fn test_tool_results_follow_their_step() {
        let message = Message::assistant("").with_parts(vec![
            MessagePart::step_start(),
            MessagePart::text("let me check"),
            MessagePart::tool_invocation(
                ToolInvocation::call("c1", "lookup", json!({"q": 1})).with_result(json!("done")),
            ),
            MessagePart::step_start(),
            MessagePart::text("all set"),
        ]);

        let core = convert_to_core_messages(&[message]);
        assert_eq!(core.len(), 3);
        assert!(matches!(&core[0], CoreMessage::Assistant { content } if content.len() == 2));
        assert_eq!(
            core[1],
            CoreMessage::Tool {
                content: vec![ToolResultContent {
                    tool_call_id: "c1".to_string(),
                    tool_name: "lookup".to_string(),
                    result: json!("done"),
                }]
            }
        );
        assert!(matches!(&core[2], CoreMessage::Assistant { content } if content.len() == 1));
    }

    #[test]
    fn test_pending_call_has_no_tool_message() {
        let message = Message::assistant("").with_parts(vec![MessagePart::tool_invocation(
            ToolInvocation::call("c1", "lookup", json!({})),
        )]);

        let core = convert_to_core_messages(&[message]);
        assert_eq!(core.len(), 1);
    }

    #[test]
    fn test_data_messages_dropped() {
        let mut data = Message::user("payload");
        data.role = Role::Data;

        assert!(convert_to_core_messages(&[data]).is_empty());
    }

    #[test]
    fn test_core_message_wire_shape() {
        let message = CoreMessage::Assistant {
            content: vec![AssistantContent::ToolCall {
                tool_call_id: "c1".to_string(),
                tool_name: "lookup".to_string(),
                args: json!({}),
            }],
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "role": "assistant",
                "content": [{"type": "tool-call", "toolCallId": "c1", "toolName": "lookup", "args": {}}]
            })
        );
    }
}
