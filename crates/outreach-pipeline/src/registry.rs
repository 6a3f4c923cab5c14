//! Agent-name to handler registry.
//!
//! The registry is an explicit value handed to the
//! [`PipelineBuilder`](crate::graph::PipelineBuilder), so independent pipelines
//! and tests can use independent registries. It is populated up front and then
//! shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::handler::{PlaceholderHandler, StepHandler};

/// Registry mapping agent names to step handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn StepHandler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under an agent name.
    ///
    /// If a handler with the same name already exists, it is replaced.
    pub fn register<H: StepHandler + 'static>(&mut self, name: impl Into<String>, handler: H) {
        self.register_arc(name, Arc::new(handler));
    }

    /// Register a handler from an Arc.
    pub fn register_arc(&mut self, name: impl Into<String>, handler: Arc<dyn StepHandler>) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(agent = %name, "Replacing previously registered handler");
        } else {
            debug!(agent = %name, "Registered handler");
        }
    }

    /// Resolve a handler by agent name.
    ///
    /// Never fails: unknown names resolve to a [`PlaceholderHandler`].
    pub fn resolve(&self, name: &str) -> Arc<dyn StepHandler> {
        match self.handlers.get(name) {
            Some(handler) => handler.clone(),
            None => Arc::new(PlaceholderHandler::new(name)),
        }
    }

    /// Check if a real handler is registered for a name.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered agent names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("agents", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{StepContext, handler_fn};
    use crate::state::{PartialState, SharedState};
    use outreach_config::StepDeclaration;
    use serde_json::json;

    fn marker(value: &'static str) -> impl StepHandler {
        handler_fn(move |_, _| Ok(PartialState::new().with("marker", json!(value))))
    }

    #[test]
    fn test_empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("anything"));
    }

    #[test]
    fn test_register_and_names_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register("ScoringAgent", marker("s"));
        registry.register("DataEnrichmentAgent", marker("d"));
        assert_eq!(registry.names(), vec!["DataEnrichmentAgent", "ScoringAgent"]);
        assert!(registry.contains("ScoringAgent"));
    }

    #[test]
    fn test_unknown_name_resolves_to_placeholder() {
        let registry = HandlerRegistry::new();
        let handler = registry.resolve("NotYetBuiltAgent");
        assert!(handler.is_placeholder());
    }

    #[tokio::test]
    async fn test_reregister_replaces() {
        let mut registry = HandlerRegistry::new();
        registry.register("A", marker("first"));
        registry.register("A", marker("second"));
        assert_eq!(registry.len(), 1);

        let out = registry
            .resolve("A")
            .handle(
                &SharedState::new(),
                &StepDeclaration::new("a", "A"),
                &StepContext::detached(),
            )
            .await
            .unwrap();
        assert_eq!(out.get("marker"), Some(&json!("second")));
    }

    #[test]
    fn test_debug_lists_agents() {
        let mut registry = HandlerRegistry::new();
        registry.register("A", marker("a"));
        assert!(format!("{:?}", registry).contains("\"A\""));
    }
}
