//! Registry of tool definitions.

use super::{ToolDefinition, ToolSpec};
use crate::errors::{RegistryError, ToolError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Immutable name -> definition map.
///
/// Cloning is cheap; all clones share the same definitions.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<BTreeMap<String, ToolDefinition>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Gets a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Checks whether a tool is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Lists registered tool names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Iterates over all definitions in name order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the specs advertised to the model.
    #[must_use]
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(ToolDefinition::spec).collect()
    }

    /// Returns a registry holding both sets of tools.
    ///
    /// Entries in `other` replace same-named entries in `self`.
    #[must_use]
    pub fn merged(&self, other: &ToolRegistry) -> ToolRegistry {
        if other.is_empty() {
            return self.clone();
        }

        let mut tools = (*self.tools).clone();
        for (name, definition) in other.tools.iter() {
            if tools.insert(name.clone(), definition.clone()).is_some() {
                debug!(tool = %name, "Merged tool replaces existing definition");
            }
        }

        ToolRegistry {
            tools: Arc::new(tools),
        }
    }

    /// Validates arguments against a tool's parameter schema.
    ///
    /// All violations are joined into one [`ToolError::InvalidArguments`].
    /// A malformed schema is reported the same way.
    pub fn validate_arguments(
        &self,
        name: &str,
        args: &serde_json::Value,
    ) -> Result<(), ToolError> {
        let definition = self.get(name).ok_or_else(|| ToolError::not_found(name))?;
        let validator = jsonschema::validator_for(&definition.parameters).map_err(|e| {
            ToolError::invalid_arguments(name, format!("invalid parameter schema: {e}"))
        })?;

        let errors: Vec<String> = validator
            .iter_errors(args)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ToolError::invalid_arguments(name, errors.join("; ")))
        }
    }

    /// Validates and runs an auto tool.
    ///
    /// This is what the model-streaming layer calls for tools that never go
    /// through approval.
    pub async fn execute_auto(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let definition = self.get(name).ok_or_else(|| ToolError::not_found(name))?;
        let Some(execute) = definition.auto_execute() else {
            return Err(ToolError::execution_failed(
                name,
                "tool requires approval and has no auto-execute function",
            ));
        };

        self.validate_arguments(name, &args)?;
        execute.execute(args).await
    }
}

/// Builder for [`ToolRegistry`].
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistryBuilder {
    /// Adds a tool.
    #[must_use]
    pub fn tool(mut self, definition: ToolDefinition) -> Self {
        self.tools.push(definition);
        self
    }

    /// Builds the registry, rejecting duplicate names.
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut tools = BTreeMap::new();
        for definition in self.tools {
            let name = definition.name.clone();
            if tools.insert(name.clone(), definition).is_some() {
                return Err(RegistryError::DuplicateTool { name });
            }
        }

        Ok(ToolRegistry {
            tools: Arc::new(tools),
        })
    }
}
