use std::sync::Arc;

use crate::config::Config;
use crate::store::Store;

/// Shared application state
///
/// The store is the only shared mutable resource; everything else is
/// read-only configuration.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state over a store and configuration
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
