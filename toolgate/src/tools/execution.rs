//! Registry of human-gated execute functions.

use super::{ExecutionContext, GatedExecute, GatedExecuteFn, ToolRegistry};
use crate::errors::{RegistryError, ToolError};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

/// Outcome of looking up a handler.
#[derive(Clone)]
pub enum ExecutionLookup {
    /// A handler is registered for the tool.
    Registered(Arc<dyn GatedExecute>),
    /// The tool is gated but nothing can execute it.
    NotRegistered,
}

impl ExecutionLookup {
    /// Returns true if a handler was found.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

impl std::fmt::Debug for ExecutionLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered(_) => f.write_str("Registered"),
            Self::NotRegistered => f.write_str("NotRegistered"),
        }
    }
}

/// Immutable name -> gated handler map.
///
/// Built against a [`ToolRegistry`]: every confirmable tool of that registry
/// is gated, and only confirmable tools may carry a handler. A gated tool
/// without a handler still goes through approval; approving it yields the
/// missing-execution outcome instead of running anything.
#[derive(Clone, Default)]
pub struct ExecutionRegistry {
    gated: Arc<BTreeSet<String>>,
    handlers: Arc<HashMap<String, Arc<dyn GatedExecute>>>,
}

impl ExecutionRegistry {
    /// Creates a registry with no gated tools.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts building a registry for the confirmable tools of `tools`.
    #[must_use]
    pub fn builder(tools: &ToolRegistry) -> ExecutionRegistryBuilder<'_> {
        ExecutionRegistryBuilder {
            tools,
            handlers: Vec::new(),
        }
    }

    /// Returns true if calls to `name` need a human decision.
    #[must_use]
    pub fn is_gated(&self, name: &str) -> bool {
        self.gated.contains(name)
    }

    /// Looks up the handler for a tool.
    #[must_use]
    pub fn lookup(&self, name: &str) -> ExecutionLookup {
        self.handlers
            .get(name)
            .map_or(ExecutionLookup::NotRegistered, |handler| {
                ExecutionLookup::Registered(Arc::clone(handler))
            })
    }

    /// Lists gated tool names in sorted order.
    pub fn gated_tools(&self) -> impl Iterator<Item = &str> {
        self.gated.iter().map(String::as_str)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for ExecutionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionRegistry")
            .field("gated", &self.gated)
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

/// Builder for [`ExecutionRegistry`].
pub struct ExecutionRegistryBuilder<'a> {
    tools: &'a ToolRegistry,
    handlers: Vec<(String, Arc<dyn GatedExecute>)>,
}

impl ExecutionRegistryBuilder<'_> {
    /// Registers a handler.
    #[must_use]
    pub fn handler(mut self, name: impl Into<String>, handler: impl GatedExecute + 'static) -> Self {
        self.handlers.push((name.into(), Arc::new(handler)));
        self
    }

    /// Registers an async closure as a handler.
    #[must_use]
    pub fn handler_fn<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(serde_json::Value, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, ToolError>> + Send + 'static,
    {
        self.handler(name, GatedExecuteFn(f))
    }

    /// Builds the registry.
    ///
    /// Fails if a handler names an unknown tool, an auto tool, or the same
    /// tool twice.
    pub fn build(self) -> Result<ExecutionRegistry, RegistryError> {
        let gated: BTreeSet<String> = self
            .tools
            .definitions()
            .filter(|definition| !definition.is_auto_executing())
            .map(|definition| definition.name.clone())
            .collect();

        let mut handlers = HashMap::with_capacity(self.handlers.len());
        for (name, handler) in self.handlers {
            match self.tools.get(&name) {
                None => return Err(RegistryError::UnknownTool { name }),
                Some(definition) if definition.is_auto_executing() => {
                    return Err(RegistryError::AutoExecuting { name });
                }
                Some(_) => {}
            }
            if handlers.insert(name.clone(), handler).is_some() {
                return Err(RegistryError::DuplicateTool { name });
            }
        }

        Ok(ExecutionRegistry {
            gated: Arc::new(gated),
            handlers: Arc::new(handlers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolDefinition;
    use serde_json::json;

    fn tools() -> ToolRegistry {
        ToolRegistry::builder()
            .tool(ToolDefinition::new("deploy"))
            .tool(ToolDefinition::new("rollback"))
            .tool(ToolDefinition::new("clock").with_auto_execute_fn(|_| async { Ok(json!("noon")) }))
            .build()
            .unwrap()
    }

    #[test]
    fn test_gated_set_is_confirmable_tools() {
        let tools = tools();
        let executions = ExecutionRegistry::builder(&tools).build().unwrap();

        assert_eq!(executions.gated_tools().collect::<Vec<_>>(), vec!["deploy", "rollback"]);
        assert!(executions.is_gated("deploy"));
        assert!(!executions.is_gated("clock"));
        assert!(!executions.is_gated("unknown"));
    }

    #[tokio::test]
    async fn test_lookup_registered_handler() {
        let tools = tools();
        let executions = ExecutionRegistry::builder(&tools)
            .handler_fn("deploy", |args, _ctx| async move { Ok(json!({"deployed": args})) })
            .build()
            .unwrap();

        let ExecutionLookup::Registered(handler) = executions.lookup("deploy") else {
            panic!("deploy should have a handler");
        };
        let ctx = ExecutionContext::new(Arc::from(Vec::new()), "c1");
        let result = handler.execute(json!("v2"), ctx).await.unwrap();
        assert_eq!(result, json!({"deployed": "v2"}));

        assert!(!executions.lookup("rollback").is_registered());
        assert_eq!(executions.handler_count(), 1);
    }

    #[test]
    fn test_rejects_unknown_tool() {
        let tools = tools();
        let err = ExecutionRegistry::builder(&tools)
            .handler_fn("launch", |_, _| async { Ok(json!(null)) })
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::UnknownTool {
                name: "launch".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_auto_tool() {
        let tools = tools();
        let err = ExecutionRegistry::builder(&tools)
            .handler_fn("clock", |_, _| async { Ok(json!(null)) })
            .build()
            .unwrap_err();

        assert!(matches!(err, RegistryError::AutoExecuting { .. }));
    }

    #[test]
    fn test_rejects_duplicate_handler() {
        let tools = tools();
        let err = ExecutionRegistry::builder(&tools)
            .handler_fn("deploy", |_, _| async { Ok(json!(1)) })
            .handler_fn("deploy", |_, _| async { Ok(json!(2)) })
            .build()
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateTool { .. }));
    }

    #[test]
    fn test_empty_registry() {
        let executions = ExecutionRegistry::empty();
        assert!(!executions.is_gated("deploy"));
        assert!(!executions.lookup("deploy").is_registered());
    }
}
