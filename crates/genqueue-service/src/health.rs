//! Dependency reachability checks.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use genqueue_core::traits::results::ResultStore;
use genqueue_core::traits::store::SharedStore;

/// Reachability of each backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Shared queue store answered.
    pub store: bool,
    /// Result database answered.
    pub database: bool,
}

impl HealthReport {
    /// Whether every dependency is reachable.
    pub fn is_healthy(&self) -> bool {
        self.store && self.database
    }
}

/// Probes the shared store and the result database.
#[derive(Debug, Clone)]
pub struct HealthService {
    store: Arc<dyn SharedStore>,
    results: Arc<dyn ResultStore>,
}

impl HealthService {
    /// Creates a new health service.
    pub fn new(store: Arc<dyn SharedStore>, results: Arc<dyn ResultStore>) -> Self {
        Self { store, results }
    }

    /// Probe every dependency. Probe errors count as unreachable.
    pub async fn check(&self) -> HealthReport {
        let store = self.store.health_check().await.unwrap_or_else(|e| {
            warn!(error = %e, "Store health check failed");
            false
        });
        let database = self.results.health_check().await.unwrap_or_else(|e| {
            warn!(error = %e, "Database health check failed");
            false
        });
        HealthReport { store, database }
    }
}
