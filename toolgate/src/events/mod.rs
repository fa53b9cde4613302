//! Outbound stream events and the sinks that receive them.
//!
//! The tool-call processor reports every resolved gated invocation through
//! an [`OutputSink`]; the model streaming layer writes text and tool-call
//! events through the same sink.

mod sink;
mod stream_event;

pub use sink::{ChannelSink, CollectingSink, LoggingSink, NoOpSink, OutputSink};
pub use stream_event::StreamEvent;

use std::sync::Arc;

/// Returns a shared sink that discards everything.
#[must_use]
pub fn noop_sink() -> Arc<dyn OutputSink> {
    Arc::new(NoOpSink)
}
