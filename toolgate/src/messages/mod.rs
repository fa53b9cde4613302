//! Conversation data model.
//!
//! This module contains:
//! - UI-facing messages and their polymorphic parts
//! - Tool invocation records embedded in assistant messages
//! - Conversion into model-neutral core messages

mod conversion;
mod types;

pub use conversion::{convert_to_core_messages, AssistantContent, CoreMessage, ToolResultContent};
pub use types::{
    Message, MessagePart, Role, ToolInvocation, ToolInvocationState, TypedPart,
};
