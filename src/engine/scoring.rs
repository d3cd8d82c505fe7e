use crate::models::assignment::ScoreBreakdown;
use crate::models::driver::Driver;

const RATING_WEIGHT: f64 = 50.0;
const EXPERIENCE_WEIGHT: f64 = 25.0;
const DISTANCE_WEIGHT: f64 = 20.0;
const LOAD_WEIGHT: f64 = 15.0;
const PERFORMANCE_WEIGHT: f64 = 10.0;

const MAX_RATING: f64 = 5.0;
const EXPERIENCE_SATURATION: f64 = 100.0;
const DISTANCE_HORIZON_KM: f64 = 10.0;
const LOAD_HORIZON: f64 = 3.0;
const UNKNOWN_DISTANCE_POINTS: f64 = 10.0;

/// Suitability of `driver` for an order, higher is better.
///
/// `distance_km` is `None` when the driver has no known location; such
/// drivers get a flat neutral distance component instead of being penalised.
pub fn compute_score(
    driver: &Driver,
    distance_km: Option<f64>,
    current_load: u32,
) -> (f64, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        rating: rating_points(driver.rating),
        experience: experience_points(driver.total_deliveries),
        distance: distance_points(distance_km),
        load: load_points(current_load),
        performance: performance_points(driver.completion_rate()),
    };

    (breakdown.total(), breakdown)
}

pub fn score(driver: &Driver, distance_km: Option<f64>, current_load: u32) -> f64 {
    compute_score(driver, distance_km, current_load).0
}

fn rating_points(rating: f64) -> f64 {
    (rating / MAX_RATING) * RATING_WEIGHT
}

fn experience_points(total_deliveries: u32) -> f64 {
    (total_deliveries as f64 / EXPERIENCE_SATURATION).min(1.0) * EXPERIENCE_WEIGHT
}

fn distance_points(distance_km: Option<f64>) -> f64 {
    match distance_km {
        Some(km) => ((DISTANCE_HORIZON_KM - km) / DISTANCE_HORIZON_KM).max(0.0) * DISTANCE_WEIGHT,
        None => UNKNOWN_DISTANCE_POINTS,
    }
}

fn load_points(current_load: u32) -> f64 {
    ((LOAD_HORIZON - current_load as f64) / LOAD_HORIZON).max(0.0) * LOAD_WEIGHT
}

fn performance_points(completion_rate: f64) -> f64 {
    completion_rate * PERFORMANCE_WEIGHT
}
