use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const NAIROBI_CBD: GeoPoint = GeoPoint {
        lat: -1.2921,
        lng: 36.8219,
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriverStatus {
    Available,
    Busy,
    Offline,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Motorcycle,
    Car,
    Van,
    Truck,
}

/// Which driver statuses count as eligible before any hard filter runs.
///
/// Automatic assignment only considers `Available` drivers. Manual dispatch
/// pools use `NotOffline` so an admin can double-book a busy driver.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum EligibilityMode {
    #[default]
    AvailableOnly,
    NotOffline,
}

impl EligibilityMode {
    pub fn admits(self, status: DriverStatus) -> bool {
        match self {
            EligibilityMode::AvailableOnly => status == DriverStatus::Available,
            EligibilityMode::NotOffline => status != DriverStatus::Offline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub status: DriverStatus,
    pub rating: f64,
    pub total_deliveries: u32,
    pub completion_rate: Option<f64>,
    pub current_location: Option<GeoPoint>,
    pub vehicle_type: VehicleType,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Completion rate in `[0, 1]`; drivers without history count as perfect.
    pub fn completion_rate(&self) -> f64 {
        self.completion_rate.unwrap_or(1.0)
    }
}
