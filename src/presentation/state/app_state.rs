use std::sync::Arc;

use crate::application::services::RelayService;

#[derive(Clone)]
pub struct AppState {
    pub relay_service: Arc<RelayService>,
    pub service_name: Arc<str>,
}

impl AppState {
    pub fn new(relay_service: Arc<RelayService>, service_name: &str) -> Self {
        Self {
            relay_service,
            service_name: Arc::from(service_name),
        }
    }
}
