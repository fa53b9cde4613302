//! Conversation fixtures.

use crate::messages::{Message, MessagePart, ToolInvocation, ToolInvocationState};
use crate::tools::Approval;

/// A tool-invocation part the user approved.
#[must_use]
pub fn approved_call(id: &str, tool: &str, args: serde_json::Value) -> MessagePart {
    MessagePart::tool_invocation(Approval::Approved.apply(ToolInvocation::call(id, tool, args)))
}

/// A tool-invocation part the user denied.
#[must_use]
pub fn denied_call(id: &str, tool: &str, args: serde_json::Value) -> MessagePart {
    MessagePart::tool_invocation(Approval::Denied.apply(ToolInvocation::call(id, tool, args)))
}

/// A tool-invocation part still waiting for the user.
#[must_use]
pub fn pending_call(id: &str, tool: &str, args: serde_json::Value) -> MessagePart {
    MessagePart::tool_invocation(ToolInvocation::call(id, tool, args))
}

/// A tool-invocation part whose arguments are still streaming.
#[must_use]
pub fn partial_call(id: &str, tool: &str) -> MessagePart {
    let mut invocation = ToolInvocation::call(id, tool, serde_json::Value::Null);
    invocation.state = ToolInvocationState::PartialCall;
    MessagePart::tool_invocation(invocation)
}

/// A user turn followed by an assistant message holding `parts`.
#[must_use]
pub fn conversation_with(parts: Vec<MessagePart>) -> Vec<Message> {
    vec![
        Message::user("").with_id("user-1"),
        Message::assistant("").with_id("assistant-1").with_parts(parts),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{APPROVAL_NO, APPROVAL_YES};
    use serde_json::json;

    #[test]
    fn test_fixture_states() {
        let approved = approved_call("a", "t", json!({}));
        assert_eq!(approved.as_tool_invocation().unwrap().result_str(), Some(APPROVAL_YES));

        let denied = denied_call("d", "t", json!({}));
        assert_eq!(denied.as_tool_invocation().unwrap().result_str(), Some(APPROVAL_NO));

        assert_eq!(
            pending_call("p", "t", json!({})).as_tool_invocation().unwrap().state,
            ToolInvocationState::Call
        );
        assert_eq!(
            partial_call("q", "t").as_tool_invocation().unwrap().state,
            ToolInvocationState::PartialCall
        );
    }

    #[test]
    fn test_conversation_with() {
        let messages = conversation_with(vec![MessagePart::text("x")]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].parts.as_ref().map(Vec::len), Some(1));
    }
}
