//! Adapter trait and registry.
//!
//! Every extraction backend is consumed through [`ExtractionAdapter`]: given
//! raw document bytes it returns an [`ExtractionResult`], and it declares two
//! capability flags the orchestrator consults. Backends that wrap missing
//! system dependencies report themselves unavailable and are filtered out by
//! [`AdapterRegistry::available`].

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::ExtractionResult;

/// Contract for an extraction backend.
///
/// `extract` must not panic; any failure is reported through the result's
/// `error` field so the orchestrator can isolate it per document.
pub trait ExtractionAdapter: Send + Sync {
    /// Display name, unique within a registry.
    fn name(&self) -> &str;

    /// Whether the backend's dependencies are satisfied on this system.
    fn is_available(&self) -> bool {
        true
    }

    /// Whether the backend folds multi-page tables into spanning logical
    /// tables. When `false` the orchestrator treats every reported table as
    /// single-page.
    fn detects_continuations(&self) -> bool {
        false
    }

    /// Whether the backend produces per-table cell data. Gates whether the
    /// cell comparator is invoked at all.
    fn supports_cell_extraction(&self) -> bool {
        false
    }

    /// Run extraction on one document.
    fn extract(&self, bytes: &[u8], file_name: &str) -> ExtractionResult;
}

/// Holds registered adapters in first-seen order.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn ExtractionAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an adapter with the same name is already
    /// registered.
    pub fn register(&mut self, adapter: Arc<dyn ExtractionAdapter>) -> Result<()> {
        if self.adapters.iter().any(|a| a.name() == adapter.name()) {
            return Err(Error::Config(format!(
                "adapter '{}' is already registered",
                adapter.name()
            )));
        }
        self.adapters.push(adapter);
        Ok(())
    }

    /// Look up an adapter by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ExtractionAdapter>> {
        self.adapters.iter().find(|a| a.name() == name).cloned()
    }

    /// Names of all registered adapters, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Adapters whose dependencies are satisfied, in registration order.
    pub fn available(&self) -> Vec<Arc<dyn ExtractionAdapter>> {
        self.adapters
            .iter()
            .filter(|a| a.is_available())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAdapter {
        name: &'static str,
        available: bool,
    }

    impl ExtractionAdapter for StubAdapter {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn extract(&self, _bytes: &[u8], file_name: &str) -> ExtractionResult {
            ExtractionResult::new(self.name, file_name)
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter {
                name: "stub",
                available: true,
            }))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("stub").is_some());
        assert!(registry.get("other").is_none());
        assert_eq!(registry.names(), vec!["stub"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter {
                name: "stub",
                available: true,
            }))
            .unwrap();

        let result = registry.register(Arc::new(StubAdapter {
            name: "stub",
            available: true,
        }));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn available_filters_unsatisfied_adapters() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(StubAdapter {
                name: "present",
                available: true,
            }))
            .unwrap();
        registry
            .register(Arc::new(StubAdapter {
                name: "absent",
                available: false,
            }))
            .unwrap();

        let available = registry.available();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name(), "present");
    }

    #[test]
    fn capability_flags_default_to_false() {
        let adapter = StubAdapter {
            name: "stub",
            available: true,
        };
        assert!(!adapter.detects_continuations());
        assert!(!adapter.supports_cell_extraction());
    }
}
