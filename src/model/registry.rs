use lazy_static::lazy_static;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{RecordType, RecordTypeBuilder};
use crate::core::{ModelError, Result};

// Global registry shared by every caller that looks models up by name
lazy_static! {
    static ref GLOBAL_REGISTRY: Arc<ModelRegistry> = Arc::new(ModelRegistry::new());
}

/// Name-indexed table of defined record types.
///
/// Defining a record type never registers it implicitly; callers opt in
/// through [`register`](ModelRegistry::register) or
/// [`define`](ModelRegistry::define).
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<RecordType>>>,
}

impl ModelRegistry {
    /// Get the process-wide registry
    pub fn global() -> &'static Arc<ModelRegistry> {
        &GLOBAL_REGISTRY
    }

    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Register a record type under its name.
    ///
    /// Registering the same definition twice is a no-op. A different
    /// definition under a taken name is rejected; use
    /// [`replace`](ModelRegistry::replace) to swap it.
    pub fn register(&self, record_type: Arc<RecordType>) -> Result<Arc<RecordType>> {
        let mut models = self.models.write()?;

        if let Some(existing) = models.get(record_type.name()) {
            if existing.id() == record_type.id() {
                return Ok(Arc::clone(existing));
            }
            return Err(ModelError::Definition(format!(
                "model '{}' is already registered",
                record_type.name()
            )));
        }

        debug!("registered model '{}'", record_type.name());
        models.insert(record_type.name().to_string(), Arc::clone(&record_type));
        Ok(record_type)
    }

    /// Build and register in one step
    pub fn define(&self, builder: RecordTypeBuilder) -> Result<Arc<RecordType>> {
        self.register(builder.build()?)
    }

    pub fn get(&self, name: &str) -> Result<Option<Arc<RecordType>>> {
        let models = self.models.read()?;
        Ok(models.get(name).cloned())
    }

    /// Register `record_type`, returning whatever was registered under its name before.
    pub fn replace(&self, record_type: Arc<RecordType>) -> Result<Option<Arc<RecordType>>> {
        let mut models = self.models.write()?;
        let previous = models.insert(record_type.name().to_string(), record_type);
        if let Some(previous) = &previous {
            warn!("replaced registered model '{}'", previous.name());
        }
        Ok(previous)
    }

    pub fn unregister(&self, name: &str) -> Result<Option<Arc<RecordType>>> {
        let mut models = self.models.write()?;
        Ok(models.remove(name))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let models = self.models.read()?;
        let mut names: Vec<String> = models.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.models.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.models.read()?.is_empty())
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
