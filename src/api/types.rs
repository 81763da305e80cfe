//! Shared context for the API routes.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::AppConfig;
use crate::provider::VisionProvider;

/// Shared state injected into every handler: the vision provider plus a
/// semaphore bounding in-flight provider calls. Handlers themselves hold no
/// other state.
#[derive(Clone)]
pub struct ApiContext {
    pub provider: Arc<dyn VisionProvider>,
    pub analysis_gate: Arc<Semaphore>,
}

impl ApiContext {
    pub fn new(provider: Arc<dyn VisionProvider>, config: &AppConfig) -> Self {
        Self {
            provider,
            analysis_gate: Arc::new(Semaphore::new(config.max_in_flight_analyses.max(1))),
        }
    }
}
