use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;

/// Shared handler state: configuration plus the store backend
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
