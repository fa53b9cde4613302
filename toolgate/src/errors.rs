//! Error types for the toolgate crate.
//!
//! Tool-level failures ([`ToolError`]) are reported per invocation and never
//! abort a processing pass. Registry construction problems ([`RegistryError`])
//! surface at startup. [`ToolgateError`] wraps everything for callers that
//! just want one error type.

use std::collections::HashMap;
use thiserror::Error;

/// The main error type for toolgate operations.
#[derive(Debug, Error)]
pub enum ToolgateError {
    /// A tool-related error.
    #[error("{0}")]
    Tool(#[from] ToolError),

    /// A registry construction error.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// The model streaming call failed.
    #[error("{0}")]
    Model(#[from] ModelError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request was cancelled before it completed.
    #[error("Request cancelled: {0}")]
    Cancelled(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolgateError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Errors raised by a tool while validating or executing a call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool is not in the registry.
    #[error("Tool not found: {name}")]
    NotFound {
        /// The tool name.
        name: String,
    },

    /// The arguments did not match the tool's parameter schema.
    #[error("Invalid arguments for tool {name}: {reason}")]
    InvalidArguments {
        /// The tool name.
        name: String,
        /// What failed to validate.
        reason: String,
    },

    /// The tool ran and failed.
    #[error("Tool execution failed: {name} - {reason}")]
    ExecutionFailed {
        /// The tool name.
        name: String,
        /// The reason for failure.
        reason: String,
    },

    /// A remote service the tool depends on failed.
    #[error("Upstream failure in tool {name}: {cause:#}")]
    Upstream {
        /// The tool name.
        name: String,
        /// The underlying error chain.
        cause: anyhow::Error,
    },
}

impl ToolError {
    /// Creates a tool not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an execution failed error.
    #[must_use]
    pub fn execution_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an upstream error.
    #[must_use]
    pub fn upstream(name: impl Into<String>, cause: anyhow::Error) -> Self {
        Self::Upstream {
            name: name.into(),
            cause,
        }
    }

    /// Returns the name of the tool the error belongs to.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        match self {
            Self::NotFound { name }
            | Self::InvalidArguments { name, .. }
            | Self::ExecutionFailed { name, .. }
            | Self::Upstream { name, .. } => name,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        let kind = match self {
            Self::NotFound { .. } => "ToolNotFound",
            Self::InvalidArguments { reason, .. } => {
                map.insert("reason".to_string(), serde_json::json!(reason));
                "ToolInvalidArguments"
            }
            Self::ExecutionFailed { reason, .. } => {
                map.insert("reason".to_string(), serde_json::json!(reason));
                "ToolExecutionError"
            }
            Self::Upstream { cause, .. } => {
                map.insert("reason".to_string(), serde_json::json!(format!("{cause:#}")));
                "ToolUpstreamError"
            }
        };

        map.insert("type".to_string(), serde_json::json!(kind));
        map.insert("name".to_string(), serde_json::json!(self.tool_name()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors raised while building the tool or execution registries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The same tool name was registered twice.
    #[error("Duplicate tool registration: {name}")]
    DuplicateTool {
        /// The tool name.
        name: String,
    },

    /// An execution handler names a tool that the tool registry lacks.
    #[error("Execution handler registered for unknown tool: {name}")]
    UnknownTool {
        /// The tool name.
        name: String,
    },

    /// An execution handler was registered for a tool that already executes
    /// automatically and therefore can never be gated.
    #[error("Tool {name} executes automatically and cannot take a gated handler")]
    AutoExecuting {
        /// The tool name.
        name: String,
    },
}

/// Failure of the model streaming collaborator.
#[derive(Debug, Error)]
#[error("Model stream failed: {message}")]
pub struct ModelError {
    /// The error message.
    pub message: String,
    /// Whether retrying the request may succeed.
    pub retryable: bool,
}

impl ModelError {
    /// Creates a new, non-retryable model error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    /// Marks the error as retryable.
    #[must_use]
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_to_dict() {
        let err = ToolError::not_found("my_tool");
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "ToolNotFound");
        assert_eq!(dict.get("name").unwrap(), "my_tool");
        assert!(!dict.contains_key("reason"));
    }

    #[test]
    fn test_execution_failed_to_dict() {
        let err = ToolError::execution_failed("deploy", "exit status 1");
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "ToolExecutionError");
        assert_eq!(dict.get("reason").unwrap(), "exit status 1");
        assert_eq!(
            dict.get("message").unwrap(),
            "Tool execution failed: deploy - exit status 1"
        );
    }

    #[test]
    fn test_upstream_error_keeps_chain() {
        let source = anyhow::anyhow!("connection reset").context("geocoding request failed");
        let err = ToolError::upstream("weather", source);

        let message = err.to_string();
        assert!(message.contains("geocoding request failed"));
        assert!(message.contains("connection reset"));
        assert_eq!(err.tool_name(), "weather");
    }

    #[test]
    fn test_registry_error_messages() {
        let err = RegistryError::AutoExecuting {
            name: "clock".to_string(),
        };
        assert!(err.to_string().contains("clock"));
    }

    #[test]
    fn test_toolgate_error_from_tool_error() {
        let err: ToolgateError = ToolError::not_found("x").into();
        assert!(matches!(err, ToolgateError::Tool(ToolError::NotFound { .. })));
    }

    #[test]
    fn test_model_error_retryable() {
        let err = ModelError::new("rate limited").retryable();
        assert!(err.retryable);
        assert_eq!(err.to_string(), "Model stream failed: rate limited");
    }
}
