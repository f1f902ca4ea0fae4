use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::db::ProgressStore;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    store: Arc<dyn ProgressStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            store,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn store(&self) -> Arc<dyn ProgressStore> {
        Arc::clone(&self.store)
    }
}
