//! Testing utilities for gated tool flows.
//!
//! This module provides:
//! - Conversation fixtures with approved, denied and pending calls
//! - A scripted model client
//! - A recording gated handler

mod fixtures;
mod mocks;

pub use fixtures::{approved_call, conversation_with, denied_call, partial_call, pending_call};
pub use mocks::{RecordingHandler, ScriptedModel};
