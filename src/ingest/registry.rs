// src/ingest/registry.rs
use std::sync::Arc;

use crate::ingest::error::NotFoundError;
use crate::ingest::types::SourceAdapter;

/// Source adapters keyed by name, iterated in registration order.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter. A second adapter whose name matches ignoring ASCII case
    /// replaces the first one and keeps its position.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        match self
            .adapters
            .iter()
            .position(|a| a.name().eq_ignore_ascii_case(adapter.name()))
        {
            Some(i) => {
                tracing::debug!(source = adapter.name(), "replacing registered adapter");
                self.adapters[i] = adapter;
            }
            None => self.adapters.push(adapter),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn SourceAdapter>, NotFoundError> {
        self.adapters
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| NotFoundError {
                name: name.to_string(),
            })
    }

    /// Resolve `names` in the given order. Fails on the first unknown name.
    pub fn select<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<Arc<dyn SourceAdapter>>, NotFoundError> {
        names.iter().map(|n| self.get(n.as_ref())).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
