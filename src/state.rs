use std::sync::Arc;

use crate::config::LaunchpadConfig;
use crate::db::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub launchpad: Arc<LaunchpadConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, launchpad: LaunchpadConfig) -> Self {
        Self {
            store,
            launchpad: Arc::new(launchpad),
        }
    }
}
