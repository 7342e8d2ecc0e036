use std::sync::Arc;

use storage::CompetitionStore;

use crate::coordinator::RecomputeCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CompetitionStore>,
    pub coordinator: RecomputeCoordinator,
}

impl AppState {
    pub fn new(store: Arc<dyn CompetitionStore>) -> Self {
        Self {
            coordinator: RecomputeCoordinator::new(store.clone()),
            store,
        }
    }
}
