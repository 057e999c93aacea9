use crate::{CoreError, Executor};
use std::collections::HashMap;
use std::sync::Arc;

/// Name-to-executor lookup, populated once at start-up
#[derive(Default, Clone)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn Executor>>,
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("executors", &self.names())
            .finish()
    }
}

impl ExecutorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under its own name
    pub fn register(&mut self, executor: Arc<dyn Executor>) -> Result<(), CoreError> {
        let name = executor.name().to_string();
        self.register_as(name, executor)
    }

    /// Register an executor under an explicit name
    pub fn register_as(
        &mut self,
        name: impl Into<String>,
        executor: Arc<dyn Executor>,
    ) -> Result<(), CoreError> {
        let name = name.into();
        if self.executors.contains_key(&name) {
            return Err(CoreError::ConfigurationError(format!(
                "executor '{}' is already registered",
                name
            )));
        }

        tracing::debug!(executor = %name, "Registered executor");
        self.executors.insert(name, executor);
        Ok(())
    }

    /// Find an executor by name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Executor>, CoreError> {
        self.executors
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::ExecutorNotRegistered(name.to_string()))
    }

    /// Whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.executors.keys().cloned().collect();
        names.sort();
        names
    }
}
