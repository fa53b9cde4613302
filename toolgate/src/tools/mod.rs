//! Tools subsystem for human-gated tool execution.
//!
//! This module provides:
//! - Tool definitions and the tool registry
//! - The execution registry of human-gated handlers
//! - Approval resolution from client sentinels
//! - The tool-call processor that finalizes approved and denied calls

mod approval;
#[cfg(feature = "open-meteo")]
pub mod builtin;
mod definitions;
mod execution;
mod processor;
mod registry;

pub use approval::{
    resolve_approval, resolve_invocation, Approval, ApprovalDecision, APPROVAL_NO, APPROVAL_YES,
};
pub use definitions::{
    AutoExecute, AutoExecuteFn, ExecutionContext, GatedExecute, GatedExecuteFn, ToolDefinition,
    ToolSpec,
};
pub use execution::{ExecutionLookup, ExecutionRegistry, ExecutionRegistryBuilder};
pub use processor::{
    process_tool_calls, InvocationFailure, ProcessedConversation, ToolCallProcessor,
    DENIED_RESULT, NO_EXECUTE_RESULT,
};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
