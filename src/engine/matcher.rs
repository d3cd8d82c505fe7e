use std::cmp::Ordering;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::engine::Collaborators;
use crate::engine::executor::{AssignmentExecutor, Commit};
use crate::engine::scoring::compute_score;
use crate::error::AssignmentError;
use crate::geo::distance_km;
use crate::models::assignment::{
    AssignmentAttempt, AssignmentCriteria, AssignmentOutcome, CriteriaOverrides, ScoreBreakdown,
};
use crate::models::driver::{Driver, DriverStatus, EligibilityMode, GeoPoint};
use crate::models::order::{Order, OrderStatus};
use crate::observability::metrics::Metrics;

/// A driver that survived every hard filter for one order.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub driver: Driver,
    pub distance_km: Option<f64>,
    pub current_load: u32,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Highest score first; equal scores fall back to the lower driver id so
/// rankings are reproducible.
fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.driver.id.cmp(&b.driver.id))
}

pub struct AssignmentMatcher {
    stores: Collaborators,
    executor: AssignmentExecutor,
    default_criteria: AssignmentCriteria,
    metrics: Metrics,
}

impl AssignmentMatcher {
    pub fn new(
        stores: Collaborators,
        default_criteria: AssignmentCriteria,
        driver_update_attempts: u32,
        metrics: Metrics,
    ) -> Self {
        let executor =
            AssignmentExecutor::new(stores.clone(), driver_update_attempts, metrics.clone());
        Self {
            stores,
            executor,
            default_criteria,
            metrics,
        }
    }

    pub fn default_criteria(&self) -> &AssignmentCriteria {
        &self.default_criteria
    }

    /// Every candidate for an order at `location`, best first.
    pub async fn rank_drivers(
        &self,
        location: &GeoPoint,
        criteria: &AssignmentCriteria,
    ) -> Result<Vec<Candidate>, AssignmentError> {
        let drivers = self
            .stores
            .drivers
            .eligible_drivers(criteria.eligibility)
            .await?;

        let mut candidates = Vec::with_capacity(drivers.len());
        for driver in drivers {
            if driver.rating < criteria.min_rating {
                debug!(driver_id = %driver.id, rating = driver.rating, "skipped: rating");
                continue;
            }

            if !criteria.allows_vehicle(driver.vehicle_type) {
                debug!(driver_id = %driver.id, vehicle = ?driver.vehicle_type, "skipped: vehicle");
                continue;
            }

            let current_load = self.current_load(driver.id).await?;
            if current_load >= criteria.max_active_orders {
                debug!(driver_id = %driver.id, current_load, "skipped: load");
                continue;
            }

            let distance = driver
                .current_location
                .as_ref()
                .map(|point| distance_km(point, location));
            if let Some(km) = distance {
                if km > criteria.max_distance_km {
                    debug!(driver_id = %driver.id, distance_km = km, "skipped: distance");
                    continue;
                }
            }

            let (score, breakdown) = compute_score(&driver, distance, current_load);
            candidates.push(Candidate {
                driver,
                distance_km: distance,
                current_load,
                score,
                breakdown,
            });
        }

        candidates.sort_by(rank_order);
        Ok(candidates)
    }

    pub async fn find_best_driver(
        &self,
        location: &GeoPoint,
        criteria: &AssignmentCriteria,
    ) -> Result<Option<Candidate>, AssignmentError> {
        let best = self.rank_drivers(location, criteria).await?.into_iter().next();
        if best.is_none() {
            warn!(lat = location.lat, lng = location.lng, "no suitable drivers");
        }
        Ok(best)
    }

    /// Picks the best driver for `order_id` and commits the assignment.
    ///
    /// Never fails outright: every error is folded into the returned outcome.
    pub async fn assign_order_to_driver(
        &self,
        order_id: Uuid,
        overrides: Option<CriteriaOverrides>,
    ) -> AssignmentOutcome {
        let start = Instant::now();
        let criteria = self.criteria_with(overrides);
        let result = self.try_assign(order_id, &criteria).await;
        self.record_attempt(order_id, result.is_ok()).await;
        self.finish(order_id, start, result)
    }

    /// Configured defaults with any caller-supplied fields laid over them.
    pub fn criteria_with(&self, overrides: Option<CriteriaOverrides>) -> AssignmentCriteria {
        match overrides {
            Some(overrides) => overrides.merged_over(&self.default_criteria),
            None => self.default_criteria.clone(),
        }
    }

    /// Binds `order_id` to a driver chosen by a dispatcher. Hard filters are
    /// skipped; only offline drivers are refused.
    pub async fn assign_order_to_specific_driver(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
    ) -> AssignmentOutcome {
        let start = Instant::now();
        let result = self.try_assign_specific(order_id, driver_id).await;
        self.finish(order_id, start, result)
    }

    pub async fn order_location(&self, order_id: Uuid) -> Result<GeoPoint, AssignmentError> {
        let order = self.load_order(order_id).await?;
        self.resolve_location(&order).await
    }

    async fn try_assign(
        &self,
        order_id: Uuid,
        criteria: &AssignmentCriteria,
    ) -> Result<(Driver, Uuid), AssignmentError> {
        let order = self.load_order(order_id).await?;
        let location = self.resolve_location(&order).await?;

        let best = self
            .find_best_driver(&location, criteria)
            .await?
            .ok_or(AssignmentError::NoEligibleDriver)?;

        let tracking_id = self
            .executor
            .commit(Commit {
                order: &order,
                driver: &best.driver,
                criteria,
                distance_km: best.distance_km,
                score: Some((best.score, best.breakdown)),
            })
            .await?;

        let mut driver = best.driver;
        driver.status = DriverStatus::Busy;
        Ok((driver, tracking_id))
    }

    async fn try_assign_specific(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
    ) -> Result<(Driver, Uuid), AssignmentError> {
        let order = self.load_order(order_id).await?;
        let mut driver = self
            .stores
            .drivers
            .get_driver(driver_id)
            .await?
            .ok_or(AssignmentError::DriverNotFound(driver_id))?;

        if !EligibilityMode::NotOffline.admits(driver.status) {
            return Err(AssignmentError::DriverOffline(driver_id));
        }

        let location = self.resolve_location(&order).await?;
        let distance = driver
            .current_location
            .as_ref()
            .map(|point| distance_km(point, &location));
        let current_load = self.current_load(driver_id).await?;
        let criteria = AssignmentCriteria {
            eligibility: EligibilityMode::NotOffline,
            ..self.default_criteria.clone()
        };

        let tracking_id = self
            .executor
            .commit(Commit {
                order: &order,
                driver: &driver,
                criteria: &criteria,
                distance_km: distance,
                score: Some(compute_score(&driver, distance, current_load)),
            })
            .await?;

        driver.status = DriverStatus::Busy;
        Ok((driver, tracking_id))
    }

    async fn record_attempt(&self, order_id: Uuid, success: bool) {
        let attempt = AssignmentAttempt {
            order_id,
            success,
            timestamp: Utc::now(),
        };
        if let Err(err) = self.stores.ledger.append_attempt(attempt).await {
            warn!(order_id = %order_id, error = %err, "failed to record assignment attempt");
        }
    }

    fn finish(
        &self,
        order_id: Uuid,
        start: Instant,
        result: Result<(Driver, Uuid), AssignmentError>,
    ) -> AssignmentOutcome {
        let elapsed = start.elapsed().as_secs_f64();
        let outcome = if result.is_ok() { "success" } else { "error" };
        self.metrics.observe_assignment(outcome, elapsed);

        match result {
            Ok((driver, tracking_id)) => AssignmentOutcome::assigned(driver, tracking_id),
            Err(err) => {
                match &err {
                    AssignmentError::Store(_) | AssignmentError::PartialCommit { .. } => {
                        error!(order_id = %order_id, error = %err, "assignment failed")
                    }
                    _ => warn!(order_id = %order_id, error = %err, "assignment failed"),
                }
                AssignmentOutcome::failed(err.to_string())
            }
        }
    }

    async fn load_order(&self, order_id: Uuid) -> Result<Order, AssignmentError> {
        self.stores
            .orders
            .get_order(order_id)
            .await?
            .ok_or(AssignmentError::OrderNotFound(order_id))
    }

    async fn resolve_location(&self, order: &Order) -> Result<GeoPoint, AssignmentError> {
        self.stores
            .geocoder
            .resolve_address(&order.address)
            .await
            .ok_or(AssignmentError::LocationUnresolvable)
    }

    async fn current_load(&self, driver_id: Uuid) -> Result<u32, AssignmentError> {
        let active = self
            .stores
            .orders
            .orders_for_driver(driver_id, &OrderStatus::ACTIVE)
            .await?;
        Ok(active.len() as u32)
    }
}
