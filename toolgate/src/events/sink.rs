//! Output sink trait and implementations.

use super::StreamEvent;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, Level};

/// Destination for events on the outbound stream.
///
/// Writing never fails from the caller's point of view. Implementations
/// that can lose events (closed channels, full buffers) log and drop.
pub trait OutputSink: Send + Sync {
    /// Writes one event.
    fn write(&self, event: StreamEvent);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl OutputSink for NoOpSink {
    fn write(&self, _event: StreamEvent) {}
}

/// A sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingSink {
    /// The log level to use.
    level: Level,
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingSink {
    /// Creates a new logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl OutputSink for LoggingSink {
    fn write(&self, event: StreamEvent) {
        let kind = event.kind();
        if self.level == Level::DEBUG {
            debug!(event_kind = %kind, event = ?event, "Stream event: {}", kind);
        } else {
            info!(event_kind = %kind, event = ?event, "Stream event: {}", kind);
        }
    }
}

/// A sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: RwLock<Vec<StreamEvent>>,
}

impl CollectingSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns the tool result events for one call.
    #[must_use]
    pub fn results_for(&self, tool_call_id: &str) -> Vec<StreamEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| matches!(e, StreamEvent::ToolResult { .. }))
            .filter(|e| e.tool_call_id() == Some(tool_call_id))
            .cloned()
            .collect()
    }
}

impl OutputSink for CollectingSink {
    fn write(&self, event: StreamEvent) {
        self.events.write().push(event);
    }
}

/// A sink that forwards events into an unbounded channel.
///
/// Used to bridge the processor to whatever transport frames the stream.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiving half of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns true if the receiver has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl OutputSink for ChannelSink {
    fn write(&self, event: StreamEvent) {
        if let Err(err) = self.tx.send(event) {
            debug!(event_kind = %err.0.kind(), "Stream receiver closed, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_noop_sink() {
        let sink = NoOpSink;
        sink.write(StreamEvent::tool_result("c", json!(1)));
        // Should not panic
    }

    #[test]
    fn test_logging_sink() {
        LoggingSink::default().write(StreamEvent::tool_result("c", json!("x")));
        LoggingSink::debug().write(StreamEvent::error("boom"));
        // Should not panic
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.write(StreamEvent::tool_result("a", json!(1)));
        sink.write(StreamEvent::error("oops"));
        sink.write(StreamEvent::tool_result("b", json!(2)));

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.results_for("a"), vec![StreamEvent::tool_result("a", json!(1))]);
        assert!(sink.results_for("missing").is_empty());

        sink.clear();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelSink::new();
        sink.write(StreamEvent::tool_result("a", json!("done")));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.tool_call_id(), Some("a"));
    }

    #[test]
    fn test_channel_sink_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);

        assert!(sink.is_closed());
        sink.write(StreamEvent::error("nobody listening"));
    }
}
