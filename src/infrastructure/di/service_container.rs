//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{IndexService, UrlListLoader};
use crate::config::Settings;
use crate::infrastructure::state_store::ExpansionStore;
use crate::infrastructure::traits::{EventSink, FileSystem, RealFileSystem, TracingEventSink};

/// Container holding shared dependencies and building services from them.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Receiver of selection and toggle events
    pub sink: Arc<dyn EventSink>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(TracingEventSink))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, sink: Arc<dyn EventSink>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, sink }
    }

    /// Loader capped at the configured `max_urls`.
    pub fn loader(&self) -> UrlListLoader {
        UrlListLoader::new(Arc::clone(&self.fs), self.settings.max_urls)
    }

    /// Empty index using the configured virtualization policy.
    pub fn index_service(&self) -> IndexService {
        IndexService::new(Arc::clone(&self.sink), self.settings.policy())
    }

    pub fn expansion_store(&self) -> ExpansionStore {
        ExpansionStore::new(Arc::clone(&self.fs))
    }
}
