//! Shared application state passed to every handler.

use std::sync::Arc;

use enrollhub_core::config::AppConfig;
use enrollhub_database::RegistrationStore;
use enrollhub_service::AdmissionEngine;
use enrollhub_service::audit::InvariantAuditor;
use enrollhub_service::gate::RegistrationGate;

/// Application state, cloned into each request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Registration store backing the engine.
    pub store: Arc<dyn RegistrationStore>,
    /// Admission engine.
    pub engine: Arc<AdmissionEngine>,
    /// Participant-facing registration gate.
    pub gate: Arc<RegistrationGate>,
    /// Read-only consistency auditor.
    pub auditor: Arc<InvariantAuditor>,
}

impl AppState {
    /// Wire the engine, gate and auditor over one store.
    pub fn new(config: AppConfig, store: Arc<dyn RegistrationStore>) -> Self {
        let engine = AdmissionEngine::new(Arc::clone(&store), &config.engine);
        Self {
            engine: Arc::new(engine),
            gate: Arc::new(RegistrationGate::new(Arc::clone(&store))),
            auditor: Arc::new(InvariantAuditor::new(Arc::clone(&store))),
            config: Arc::new(config),
            store,
        }
    }
}
