// Application state module
// Shared by every connection task; constructed once in main

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::processor::{EchoProcessor, QueryProcessor};

/// Application state
pub struct AppState {
    pub config: Config,
    pub processor: Arc<dyn QueryProcessor>,
    pub active_connections: AtomicUsize,
    /// Fired once when the accept loop should stop
    pub shutdown: Notify,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_processor(config, Arc::new(EchoProcessor))
    }

    pub fn with_processor(config: Config, processor: Arc<dyn QueryProcessor>) -> Self {
        Self {
            config,
            processor,
            active_connections: AtomicUsize::new(0),
            shutdown: Notify::new(),
        }
    }
}
