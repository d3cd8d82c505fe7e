//! Contracts for the external collaborators the assignment engine talks to.
//!
//! Every call is an await point against a remote document store in
//! production; the in-memory implementations in [`memory`] back the HTTP
//! service and the tests.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::assignment::{AssignmentAttempt, AssignmentRecord, DriverNotification};
use crate::models::driver::{Driver, DriverStatus, EligibilityMode};
use crate::models::order::{Order, OrderStatus, OrderUpdate};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn update_order(&self, id: Uuid, update: OrderUpdate) -> Result<(), StoreError>;

    async fn orders_for_driver(
        &self,
        driver_id: Uuid,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
pub trait DriverDirectory: Send + Sync {
    async fn eligible_drivers(&self, mode: EligibilityMode) -> Result<Vec<Driver>, StoreError>;

    async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError>;

    async fn update_driver_status(&self, id: Uuid, status: DriverStatus)
    -> Result<(), StoreError>;
}

/// Append-only audit trail of assignments and assignment attempts.
#[async_trait]
pub trait AssignmentLedger: Send + Sync {
    async fn append_record(&self, record: AssignmentRecord) -> Result<(), StoreError>;

    async fn records_since(&self, since: DateTime<Utc>)
    -> Result<Vec<AssignmentRecord>, StoreError>;

    async fn append_attempt(&self, attempt: AssignmentAttempt) -> Result<(), StoreError>;

    async fn attempts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<AssignmentAttempt>, StoreError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: DriverNotification) -> Result<(), StoreError>;
}
