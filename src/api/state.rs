//! Application state shared by all handlers

use std::sync::Arc;

use crate::domain::GenerationBackend;
use crate::infrastructure::api_key::AccessGateway;

/// Built once at startup and cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AccessGateway>,
    pub backend: Arc<dyn GenerationBackend>,
}

impl AppState {
    pub fn new(gateway: Arc<AccessGateway>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { gateway, backend }
    }
}
