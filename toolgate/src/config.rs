//! Agent configuration.
//!
//! Values come from defaults, a JSON document, or `TOOLGATE_*` environment
//! variables layered over either.

use crate::errors::ToolgateError;
use crate::observability::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "open-meteo")]
use crate::tools::builtin::OpenMeteoConfig;

/// Environment variable overriding [`AgentConfig::model`].
pub const ENV_MODEL: &str = "TOOLGATE_MODEL";
/// Environment variable overriding [`AgentConfig::max_steps`].
pub const ENV_MAX_STEPS: &str = "TOOLGATE_MAX_STEPS";
/// Environment variable overriding [`AgentConfig::system_prompt`].
pub const ENV_SYSTEM_PROMPT: &str = "TOOLGATE_SYSTEM_PROMPT";
/// Environment variable overriding [`AgentConfig::log_format`].
pub const ENV_LOG_FORMAT: &str = "TOOLGATE_LOG_FORMAT";

/// Configuration for the chat agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// System prompt sent with every model request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum number of model steps per request.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Endpoints for the sample tools.
    #[cfg(feature = "open-meteo")]
    #[serde(default)]
    pub open_meteo: OpenMeteoConfig,
}

fn default_system_prompt() -> String {
    "You are a helpful assistant that can do various tasks...".to_string()
}

fn default_model() -> String {
    "@cf/meta/llama-3.2-1b-instruct".to_string()
}

fn default_max_steps() -> u32 {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            model: default_model(),
            max_steps: default_max_steps(),
            log_format: LogFormat::default(),
            #[cfg(feature = "open-meteo")]
            open_meteo: OpenMeteoConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the step limit.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ToolgateError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ToolgateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Builds a configuration from defaults and the process environment.
    pub fn from_env() -> Result<Self, ToolgateError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `TOOLGATE_*` overrides resolved through `lookup`, then validates.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ToolgateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_MODEL) {
            self.model = model;
        }
        if let Some(prompt) = lookup(ENV_SYSTEM_PROMPT) {
            self.system_prompt = prompt;
        }
        if let Some(steps) = lookup(ENV_MAX_STEPS) {
            self.max_steps = steps.trim().parse().map_err(|_| {
                ToolgateError::config(format!("{ENV_MAX_STEPS} must be a positive integer, got '{steps}'"))
            })?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format.parse()?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks the configuration for values the agent cannot run with.
    pub fn validate(&self) -> Result<(), ToolgateError> {
        if self.max_steps == 0 {
            return Err(ToolgateError::config("max_steps must be at least 1"));
        }
        if self.model.trim().is_empty() {
            return Err(ToolgateError::config("model must not be empty"));
        }
        #[cfg(feature = "open-meteo")]
        self.open_meteo.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.model, "@cf/meta/llama-3.2-1b-instruct");
        assert_eq!(config.max_steps, 10);
        assert!(config.system_prompt.starts_with("You are a helpful assistant"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = AgentConfig::from_json_str(r#"{"max_steps": 3, "log_format": "json"}"#).unwrap();
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.model, default_model());
    }

    #[test]
    fn test_json_validation_errors() {
        assert!(matches!(
            AgentConfig::from_json_str(r#"{"max_steps": 0}"#),
            Err(ToolgateError::Config(_))
        ));
        assert!(matches!(
            AgentConfig::from_json_str(r#"{"model": "  "}"#),
            Err(ToolgateError::Config(_))
        ));
        assert!(matches!(
            AgentConfig::from_json_str("not json"),
            Err(ToolgateError::Serialization(_))
        ));
    }

    #[cfg(feature = "open-meteo")]
    #[test]
    fn test_bad_open_meteo_timeout_rejected() {
        for json in [
            r#"{"open_meteo": {"timeout_seconds": -1}}"#,
            r#"{"open_meteo": {"timeout_seconds": 0}}"#,
            r#"{"open_meteo": {"timeout_seconds": 1e300}}"#,
        ] {
            assert!(
                matches!(AgentConfig::from_json_str(json), Err(ToolgateError::Config(_))),
                "{json} should be rejected"
            );
        }

        let config = AgentConfig::from_json_str(r#"{"open_meteo": {"timeout_seconds": 0.5}}"#).unwrap();
        assert_eq!(config.open_meteo.timeout().unwrap().as_millis(), 500);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"model": "@cf/test/model", "system_prompt": "Be brief."}}"#).unwrap();

        let config = AgentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.model, "@cf/test/model");
        assert_eq!(config.system_prompt, "Be brief.");

        let missing = AgentConfig::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ToolgateError::Io(_))));
    }

    #[test]
    fn test_overrides() {
        let config = AgentConfig::default()
            .with_overrides(lookup_from(&[
                (ENV_MODEL, "@cf/other"),
                (ENV_MAX_STEPS, " 4 "),
                (ENV_LOG_FORMAT, "pretty"),
            ]))
            .unwrap();

        assert_eq!(config.model, "@cf/other");
        assert_eq!(config.max_steps, 4);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.system_prompt, default_system_prompt());
    }

    #[test]
    fn test_bad_overrides_rejected() {
        let err = AgentConfig::default()
            .with_overrides(lookup_from(&[(ENV_MAX_STEPS, "many")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_STEPS));

        assert!(AgentConfig::default()
            .with_overrides(lookup_from(&[(ENV_MAX_STEPS, "0")]))
            .is_err());
        assert!(AgentConfig::default()
            .with_overrides(lookup_from(&[(ENV_LOG_FORMAT, "xml")]))
            .is_err());
    }
}
