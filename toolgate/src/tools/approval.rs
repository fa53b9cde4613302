//! Approval classification for tool invocations.
//!
//! The client records a human decision by writing one of two sentinel
//! strings into the invocation's result. Anything else in a `result`-state
//! invocation means the call was already finalized by an earlier pass.

use super::ExecutionRegistry;
use crate::messages::{MessagePart, ToolInvocation, ToolInvocationState};
use serde::{Deserialize, Serialize};

/// Result value the client writes when the user approves a call.
pub const APPROVAL_YES: &str = "Yes, confirmed.";

/// Result value the client writes when the user denies a call.
pub const APPROVAL_NO: &str = "No, denied.";

/// A human decision on a gated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    /// The user allowed the call.
    Approved,
    /// The user refused the call.
    Denied,
}

impl Approval {
    /// Returns the sentinel string for this decision.
    #[must_use]
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::Approved => APPROVAL_YES,
            Self::Denied => APPROVAL_NO,
        }
    }

    /// Records the decision on an invocation, moving it to the `result` state.
    #[must_use]
    pub fn apply(self, invocation: ToolInvocation) -> ToolInvocation {
        invocation.with_result(serde_json::Value::String(self.sentinel().to_string()))
    }

    /// Parses a result value, matching the sentinels exactly.
    #[must_use]
    pub fn from_result(result: &serde_json::Value) -> Option<Self> {
        match result.as_str()? {
            APPROVAL_YES => Some(Self::Approved),
            APPROVAL_NO => Some(Self::Denied),
            _ => None,
        }
    }
}

/// What the processor has to do with one part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// Not a gated invocation, or no decision yet.
    Skip,
    /// Execute the tool.
    Approved,
    /// Reject the call.
    Denied,
    /// A previous pass already replaced the sentinel.
    AlreadyResolved,
}

impl ApprovalDecision {
    /// Returns true if the processor must finalize the part.
    #[must_use]
    pub fn needs_action(self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }

    /// Returns the decision as a string for logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::AlreadyResolved => "already_resolved",
        }
    }
}

/// Classifies a message part.
#[must_use]
pub fn resolve_approval(part: &MessagePart, executions: &ExecutionRegistry) -> ApprovalDecision {
    part.as_tool_invocation()
        .map_or(ApprovalDecision::Skip, |invocation| {
            resolve_invocation(invocation, executions)
        })
}

/// Classifies a tool invocation.
#[must_use]
pub fn resolve_invocation(
    invocation: &ToolInvocation,
    executions: &ExecutionRegistry,
) -> ApprovalDecision {
    if !executions.is_gated(&invocation.tool_name)
        || invocation.state != ToolInvocationState::Result
    {
        return ApprovalDecision::Skip;
    }

    let Some(result) = invocation.result.as_ref() else {
        return ApprovalDecision::Skip;
    };

    match Approval::from_result(result) {
        Some(Approval::Approved) => ApprovalDecision::Approved,
        Some(Approval::Denied) => ApprovalDecision::Denied,
        None => ApprovalDecision::AlreadyResolved,
    }
}
