use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::store::ReadingStore;

/// Shared handles for request handlers.
///
/// The store is opened once at startup and injected here; handlers never reach
/// for a global connection.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Deadline applied to each store query made on behalf of a request.
    #[must_use]
    pub fn store_deadline(&self) -> Duration {
        Duration::from_secs(self.config.store_timeout_seconds)
    }
}
