//! Application state containing the registry and request limits

use std::sync::Arc;

use crate::registry::Registry;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Business function catalogue, read-only once built
    pub registry: Arc<Registry>,
    /// Largest accepted batch, in records
    pub max_batch_size: usize,
}

impl AppState {
    pub fn new(registry: Registry, max_batch_size: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            max_batch_size,
        }
    }

    /// State with every built-in registry entry
    pub fn builtin(max_batch_size: usize) -> Self {
        Self::new(Registry::builtin(), max_batch_size)
    }
}
