use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::Collaborators;
use crate::error::{AssignmentError, StoreError};
use crate::models::assignment::{
    AssignmentCriteria, AssignmentRecord, DriverNotification, ScoreBreakdown,
};
use crate::models::driver::{Driver, DriverStatus};
use crate::models::order::{Order, OrderStatus, OrderUpdate};
use crate::observability::metrics::Metrics;

const MINUTES_PER_KM: f64 = 3.0;
const PICKUP_BUFFER_MINUTES: i64 = 15;
const UNKNOWN_DISTANCE_ETA_MINUTES: i64 = 30;

/// Everything the executor needs to bind one order to one driver.
#[derive(Debug, Clone)]
pub struct Commit<'a> {
    pub order: &'a Order,
    pub driver: &'a Driver,
    pub criteria: &'a AssignmentCriteria,
    pub distance_km: Option<f64>,
    pub score: Option<(f64, ScoreBreakdown)>,
}

/// Applies the assignment state transition as an ordered sequence of writes.
///
/// The writes are not transactional. Order and driver updates are fatal on
/// failure; the audit record and the notification are best effort.
pub struct AssignmentExecutor {
    stores: Collaborators,
    driver_update_attempts: u32,
    metrics: Metrics,
}

impl AssignmentExecutor {
    pub fn new(stores: Collaborators, driver_update_attempts: u32, metrics: Metrics) -> Self {
        Self {
            stores,
            driver_update_attempts: driver_update_attempts.max(1),
            metrics,
        }
    }

    /// Commits the assignment and returns the tracking id of its audit record.
    pub async fn commit(&self, commit: Commit<'_>) -> Result<Uuid, AssignmentError> {
        let now = Utc::now();
        let order_id = commit.order.id;
        let driver = commit.driver;

        self.stores
            .orders
            .update_order(
                order_id,
                OrderUpdate {
                    status: Some(OrderStatus::Confirmed),
                    assigned_driver: Some(driver.id),
                    driver_name: Some(driver.name.clone()),
                    assigned_at: Some(now),
                    estimated_pickup_time: Some(estimated_pickup_time(now, commit.distance_km)),
                },
            )
            .await?;

        if let Err(reason) = self.mark_driver_busy(driver.id).await {
            self.metrics.partial_commits_total.inc();
            error!(
                order_id = %order_id,
                driver_id = %driver.id,
                error = %reason,
                "order confirmed but driver still not marked busy"
            );
            return Err(AssignmentError::PartialCommit {
                order_id,
                driver_id: driver.id,
                reason,
            });
        }

        let record = AssignmentRecord {
            id: Uuid::new_v4(),
            order_id,
            driver_id: driver.id,
            criteria: commit.criteria.clone(),
            distance_km: commit.distance_km,
            score: commit.score.map(|(total, _)| total),
            score_breakdown: commit.score.map(|(_, breakdown)| breakdown),
            order_created_at: Some(commit.order.created_at),
            timestamp: now,
        };
        let tracking_id = record.id;

        if let Err(err) = self.stores.ledger.append_record(record).await {
            warn!(order_id = %order_id, error = %err, "failed to append assignment record");
        }

        let notification = DriverNotification {
            id: Uuid::new_v4(),
            driver_id: driver.id,
            order_id,
            kind: DriverNotification::ORDER_ASSIGNMENT.to_string(),
            message: format!("New pickup assigned: {}", commit.order.address),
            created_at: now,
        };
        if let Err(err) = self.stores.notifier.notify(notification).await {
            self.metrics.notification_failures_total.inc();
            warn!(driver_id = %driver.id, error = %err, "failed to notify driver");
        }

        info!(
            order_id = %order_id,
            driver_id = %driver.id,
            distance_km = ?commit.distance_km,
            score = ?commit.score.map(|(total, _)| total),
            "order assigned"
        );

        Ok(tracking_id)
    }

    async fn mark_driver_busy(&self, driver_id: Uuid) -> Result<(), StoreError> {
        let mut attempt = 1;
        loop {
            match self
                .stores
                .drivers
                .update_driver_status(driver_id, DriverStatus::Busy)
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) if attempt < self.driver_update_attempts => {
                    warn!(
                        driver_id = %driver_id,
                        attempt,
                        error = %err,
                        "driver status update failed; retrying"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Pickup estimate: three minutes per kilometre plus a fixed buffer, or a
/// flat half hour when the driver's position is unknown.
pub fn estimated_pickup_time(now: DateTime<Utc>, distance_km: Option<f64>) -> DateTime<Utc> {
    let eta_minutes = match distance_km {
        Some(km) => (km * MINUTES_PER_KM).round() as i64 + PICKUP_BUFFER_MINUTES,
        None => UNKNOWN_DISTANCE_ETA_MINUTES,
    };
    now + Duration::minutes(eta_minutes)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::estimated_pickup_time;

    #[test]
    fn eta_scales_with_distance() {
        let now = Utc::now();
        assert_eq!(
            estimated_pickup_time(now, Some(2.0)),
            now + Duration::minutes(21)
        );
        assert_eq!(
            estimated_pickup_time(now, Some(4.49)),
            now + Duration::minutes(28)
        );
        assert_eq!(
            estimated_pickup_time(now, Some(0.0)),
            now + Duration::minutes(15)
        );
    }

    #[test]
    fn eta_defaults_to_half_an_hour_without_location() {
        let now = Utc::now();
        assert_eq!(estimated_pickup_time(now, None), now + Duration::minutes(30));
    }
}
