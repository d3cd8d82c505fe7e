use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::{Driver, EligibilityMode, VehicleType};

/// Weighted points per scoring factor; the total score is their sum.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub rating: f64,
    pub experience: f64,
    pub distance: f64,
    pub load: f64,
    pub performance: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.rating + self.experience + self.distance + self.load + self.performance
    }
}

/// Per-call hard filters applied before scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentCriteria {
    pub max_distance_km: f64,
    pub min_rating: f64,
    pub max_active_orders: u32,
    pub preferred_vehicle_types: Option<Vec<VehicleType>>,
    pub eligibility: EligibilityMode,
}

impl Default for AssignmentCriteria {
    fn default() -> Self {
        Self {
            max_distance_km: 10.0,
            min_rating: 4.0,
            max_active_orders: 3,
            preferred_vehicle_types: None,
            eligibility: EligibilityMode::AvailableOnly,
        }
    }
}

impl AssignmentCriteria {
    pub fn allows_vehicle(&self, vehicle: VehicleType) -> bool {
        match &self.preferred_vehicle_types {
            Some(allowed) if !allowed.is_empty() => allowed.contains(&vehicle),
            _ => true,
        }
    }
}

/// Caller-supplied criteria; unset fields keep the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CriteriaOverrides {
    pub max_distance_km: Option<f64>,
    pub min_rating: Option<f64>,
    pub max_active_orders: Option<u32>,
    pub preferred_vehicle_types: Option<Vec<VehicleType>>,
    pub eligibility: Option<EligibilityMode>,
}

impl CriteriaOverrides {
    pub fn merged_over(self, base: &AssignmentCriteria) -> AssignmentCriteria {
        AssignmentCriteria {
            max_distance_km: self.max_distance_km.unwrap_or(base.max_distance_km),
            min_rating: self.min_rating.unwrap_or(base.min_rating),
            max_active_orders: self.max_active_orders.unwrap_or(base.max_active_orders),
            preferred_vehicle_types: self
                .preferred_vehicle_types
                .or_else(|| base.preferred_vehicle_types.clone()),
            eligibility: self.eligibility.unwrap_or(base.eligibility),
        }
    }
}

/// Append-only audit entry written once per committed assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub driver_id: Uuid,
    pub criteria: AssignmentCriteria,
    pub distance_km: Option<f64>,
    pub score: Option<f64>,
    pub score_breakdown: Option<ScoreBreakdown>,
    pub order_created_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

/// One call to automatic assignment, successful or not. Manual
/// assignments are not tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentAttempt {
    pub order_id: Uuid,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver: Option<Driver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssignmentOutcome {
    pub fn assigned(driver: Driver, tracking_id: Uuid) -> Self {
        Self {
            success: true,
            assigned_driver: Some(driver),
            tracking_id: Some(tracking_id),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            assigned_driver: None,
            tracking_id: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub order_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    Today,
    Week,
    Month,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverAssignmentCount {
    pub driver_id: Uuid,
    pub assignments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub period: StatsPeriod,
    pub total_assignments: usize,
    /// Mean minutes from order creation to assignment commit, if any record carries it.
    pub average_assignment_time_minutes: Option<f64>,
    /// Committed attempts over all attempts; `None` when no attempt was tracked.
    pub success_rate: Option<f64>,
    pub top_drivers: Vec<DriverAssignmentCount>,
}

impl StatsSummary {
    pub fn empty(period: StatsPeriod) -> Self {
        Self {
            period,
            total_assignments: 0,
            average_assignment_time_minutes: None,
            success_rate: None,
            top_drivers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverNotification {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub order_id: Uuid,
    pub kind: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl DriverNotification {
    pub const ORDER_ASSIGNMENT: &'static str = "order_assignment";
}
