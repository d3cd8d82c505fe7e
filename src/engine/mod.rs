pub mod batch;
pub mod executor;
pub mod matcher;
pub mod scoring;
pub mod stats;

use std::sync::Arc;

use crate::geo::Geocoder;
use crate::store::{AssignmentLedger, DriverDirectory, NotificationSink, OrderStore};

/// Handles to the external services the engine reads from and writes to.
#[derive(Clone)]
pub struct Collaborators {
    pub orders: Arc<dyn OrderStore>,
    pub drivers: Arc<dyn DriverDirectory>,
    pub ledger: Arc<dyn AssignmentLedger>,
    pub notifier: Arc<dyn NotificationSink>,
    pub geocoder: Arc<dyn Geocoder>,
}
