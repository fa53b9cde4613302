//! Chat agent that wires the tool-call processor to a model client.

mod chat;
mod model;

pub use chat::{ChatAgent, ChatOutcome};
pub use model::{FinishInfo, ModelClient, StreamRequest};
