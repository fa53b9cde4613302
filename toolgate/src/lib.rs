//! # Toolgate
//!
//! A human-approval gate for tool invocations in streaming chat agents.
//!
//! Tools come in two flavours:
//!
//! - **Auto tools** carry their own execute function and are run by the model
//!   streaming layer without asking anyone.
//! - **Confirmable tools** are shown to the user first. The client records the
//!   decision by writing `"Yes, confirmed."` or `"No, denied."` into the
//!   invocation's result, and the [`tools::ToolCallProcessor`] turns that
//!   decision into a real result on the next request.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use toolgate::prelude::*;
//!
//! let tools = ToolRegistry::builder()
//!     .tool(ToolDefinition::new("deploy").with_description("Deploys a version"))
//!     .build()?;
//! let executions = ExecutionRegistry::builder(&tools)
//!     .handler_fn("deploy", |args, _ctx| async move { Ok(args) })
//!     .build()?;
//!
//! let processor = ToolCallProcessor::new(executions, Arc::new(LoggingSink::default()));
//! let processed = processor.process(messages).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod agent;
pub mod cancellation;
pub mod config;
pub mod errors;
pub mod events;
pub mod messages;
pub mod observability;
pub mod testing;
pub mod tools;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::{ChatAgent, ChatOutcome, FinishInfo, ModelClient, StreamRequest};
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::AgentConfig;
    pub use crate::errors::{ModelError, RegistryError, ToolError, ToolgateError};
    pub use crate::events::{
        ChannelSink, CollectingSink, LoggingSink, NoOpSink, OutputSink, StreamEvent,
    };
    pub use crate::messages::{
        Message, MessagePart, Role, ToolInvocation, ToolInvocationState,
    };
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::tools::{
        process_tool_calls, Approval, ApprovalDecision, ExecutionContext, ExecutionRegistry,
        ProcessedConversation, ToolCallProcessor, ToolDefinition, ToolRegistry,
    };
}
