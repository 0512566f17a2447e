// Application state module
// Read-only configuration plus the few counters the server loop shares

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::api::RouteTable;

/// Application state
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    pub shutdown: Arc<Notify>,
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_routes(config, RouteTable::standard())
    }

    pub fn with_routes(config: &Config, routes: RouteTable) -> Self {
        Self {
            config: config.clone(),
            routes,
            shutdown: Arc::new(Notify::new()),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
