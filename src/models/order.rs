use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses that count toward a driver's current load.
    pub const ACTIVE: [OrderStatus; 2] = [OrderStatus::Confirmed, OrderStatus::InProgress];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub status: OrderStatus,
    pub assigned_driver: Option<Uuid>,
    pub driver_name: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub estimated_pickup_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_name: customer_name.into(),
            address: address.into(),
            status: OrderStatus::Pending,
            assigned_driver: None,
            driver_name: None,
            assigned_at: None,
            estimated_pickup_time: None,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: OrderUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(driver_id) = update.assigned_driver {
            self.assigned_driver = Some(driver_id);
        }
        if let Some(name) = update.driver_name {
            self.driver_name = Some(name);
        }
        if let Some(at) = update.assigned_at {
            self.assigned_at = Some(at);
        }
        if let Some(eta) = update.estimated_pickup_time {
            self.estimated_pickup_time = Some(eta);
        }
    }
}

/// Partial write against an order document; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub assigned_driver: Option<Uuid>,
    pub driver_name: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub estimated_pickup_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{Order, OrderStatus, OrderUpdate};

    #[test]
    fn partial_update_leaves_unset_fields_alone() {
        let mut order = Order::new("Wanjiku", "Kilimani, Nairobi");
        let driver_id = Uuid::new_v4();

        order.apply(OrderUpdate {
            assigned_driver: Some(driver_id),
            ..OrderUpdate::default()
        });

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.assigned_driver, Some(driver_id));
        assert!(order.driver_name.is_none());

        let now = Utc::now();
        order.apply(OrderUpdate {
            status: Some(OrderStatus::Confirmed),
            assigned_at: Some(now),
            ..OrderUpdate::default()
        });

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.assigned_driver, Some(driver_id));
        assert_eq!(order.assigned_at, Some(now));
    }
}
