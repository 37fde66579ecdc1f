use std::sync::Arc;

use crate::config::SimulationConfig;
use crate::probe::HostResolver;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn HostResolver + Send + Sync>,
    pub sim: Arc<SimulationConfig>,
}

impl AppState {
    pub fn new(resolver: Arc<dyn HostResolver + Send + Sync>, sim: SimulationConfig) -> Self {
        Self {
            resolver,
            sim: Arc::new(sim),
        }
    }
}
