use std::sync::Arc;

use crate::store::DocumentStore;

/// State shared by every API handler.
pub struct AppState {
    /// Where the scraper's documents live
    pub store: Arc<dyn DocumentStore>,
    /// Service start time, for `/health`
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            started_at: chrono::Utc::now(),
        }
    }
}
