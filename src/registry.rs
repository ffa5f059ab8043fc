//! Name → factory lookup for pluggable capabilities.
//!
//! One generic registry serves algorithms, dataset loaders, and metrics.
//! Registries are explicitly constructed values handed into setup; there is
//! no process-wide registry state.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Error, Result};

/// Factory closure building a capability instance from its JSON config.
pub type Factory<C> = Box<dyn Fn(&Value) -> Result<Box<C>> + Send + Sync>;

/// Generic name → factory registry for one capability kind.
///
/// `kind` is a human-readable capability kind ("algorithm", "metric", ...)
/// used in error messages.
pub struct Registry<C: ?Sized> {
    kind: &'static str,
    factories: HashMap<String, Factory<C>>,
}

impl<C: ?Sized> Registry<C> {
    /// Create an empty registry for the given capability kind.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: HashMap::new(),
        }
    }

    /// Capability kind this registry serves.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register a factory under `name`.
    ///
    /// Re-registering an existing name silently overwrites it (last writer
    /// wins). Registration happens during setup, before any evaluation runs.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<Box<C>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Build a capability instance from its config.
    ///
    /// The factory either returns a fully usable instance or an error; there
    /// is no partially constructed state.
    pub fn create(&self, name: &str, config: &Value) -> Result<Box<C>> {
        let factory = self.factories.get(name).ok_or_else(|| Error::NotRegistered {
            kind: self.kind,
            name: name.to_string(),
        })?;
        factory(config)
    }

    /// Whether `name` has a registered factory.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
