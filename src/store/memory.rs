use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::assignment::{AssignmentAttempt, AssignmentRecord, DriverNotification};
use crate::models::driver::{Driver, DriverStatus, EligibilityMode};
use crate::models::order::{Order, OrderStatus, OrderUpdate};
use crate::store::{AssignmentLedger, DriverDirectory, NotificationSink, OrderStore};

/// Process-local stand-in for the hosted document database.
#[derive(Default)]
pub struct InMemoryStore {
    pub orders: DashMap<Uuid, Order>,
    pub drivers: DashMap<Uuid, Driver>,
    pub records: DashMap<Uuid, AssignmentRecord>,
    attempts: DashMap<Uuid, AssignmentAttempt>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn insert_driver(&self, driver: Driver) {
        self.drivers.insert(driver.id, driver);
    }

    /// All audit records, oldest first.
    pub fn all_records(&self) -> Vec<AssignmentRecord> {
        let mut records: Vec<AssignmentRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.timestamp);
        records
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_order(&self, id: Uuid, update: OrderUpdate) -> Result<(), StoreError> {
        let mut order = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;
        order.apply(update);
        Ok(())
    }

    async fn orders_for_driver(
        &self,
        driver_id: Uuid,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.assigned_driver == Some(driver_id) && statuses.contains(&order.status)
            })
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[async_trait]
impl DriverDirectory for InMemoryStore {
    async fn eligible_drivers(&self, mode: EligibilityMode) -> Result<Vec<Driver>, StoreError> {
        let mut drivers: Vec<Driver> = self
            .drivers
            .iter()
            .filter(|entry| mode.admits(entry.value().status))
            .map(|entry| entry.value().clone())
            .collect();
        // DashMap iteration order is arbitrary; keep listings stable.
        drivers.sort_by_key(|driver| driver.id);
        Ok(drivers)
    }

    async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        Ok(self.drivers.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_driver_status(
        &self,
        id: Uuid,
        status: DriverStatus,
    ) -> Result<(), StoreError> {
        let mut driver = self
            .drivers
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("driver {id}")))?;
        driver.status = status;
        driver.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AssignmentLedger for InMemoryStore {
    async fn append_record(&self, record: AssignmentRecord) -> Result<(), StoreError> {
        self.records.insert(record.id, record);
        Ok(())
    }

    async fn records_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<AssignmentRecord>, StoreError> {
        let mut records: Vec<AssignmentRecord> = self
            .records
            .iter()
            .filter(|entry| entry.value().timestamp >= since)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }

    async fn append_attempt(&self, attempt: AssignmentAttempt) -> Result<(), StoreError> {
        self.attempts.insert(Uuid::new_v4(), attempt);
        Ok(())
    }

    async fn attempts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<AssignmentAttempt>, StoreError> {
        let mut attempts: Vec<AssignmentAttempt> = self
            .attempts
            .iter()
            .filter(|entry| entry.value().timestamp >= since)
            .map(|entry| entry.value().clone())
            .collect();
        attempts.sort_by_key(|attempt| attempt.timestamp);
        Ok(attempts)
    }
}

/// Publishes driver notifications to every connected dispatch client.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<DriverNotification>,
}

impl BroadcastNotifier {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer_size);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DriverNotification> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotifier {
    async fn notify(&self, notification: DriverNotification) -> Result<(), StoreError> {
        let driver_id = notification.driver_id;
        if self.tx.send(notification).is_err() {
            // Nobody listening is not a delivery failure.
            debug!(driver_id = %driver_id, "no notification subscribers");
        }
        Ok(())
    }
}
