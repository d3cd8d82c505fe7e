use std::sync::Arc;

use crate::config::Config;
use crate::engine::Collaborators;
use crate::engine::batch::BatchCoordinator;
use crate::engine::matcher::AssignmentMatcher;
use crate::engine::stats::AssignmentStats;
use crate::geo::FixedPointGeocoder;
use crate::observability::metrics::Metrics;
use crate::store::memory::{BroadcastNotifier, InMemoryStore};

pub struct AppState {
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<BroadcastNotifier>,
    pub matcher: Arc<AssignmentMatcher>,
    pub batch: BatchCoordinator,
    pub stats: AssignmentStats,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(BroadcastNotifier::new(config.event_buffer_size));
        let metrics = Metrics::new();

        let collaborators = Collaborators {
            orders: store.clone(),
            drivers: store.clone(),
            ledger: store.clone(),
            notifier: notifier.clone(),
            geocoder: Arc::new(FixedPointGeocoder::new(config.default_location)),
        };

        let matcher = Arc::new(AssignmentMatcher::new(
            collaborators,
            config.default_criteria.clone(),
            config.driver_update_attempts,
            metrics.clone(),
        ));

        Self {
            batch: BatchCoordinator::new(matcher.clone(), config.batch_pacing),
            stats: AssignmentStats::new(store.clone()),
            store,
            notifier,
            matcher,
            metrics,
        }
    }
}
