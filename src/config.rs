use std::env;
use std::time::Duration;

use crate::engine::batch::DEFAULT_PACING;
use crate::error::AppError;
use crate::models::assignment::AssignmentCriteria;
use crate::models::driver::GeoPoint;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub batch_pacing: Duration,
    pub driver_update_attempts: u32,
    pub default_criteria: AssignmentCriteria,
    pub default_location: GeoPoint,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            event_buffer_size: 1024,
            batch_pacing: DEFAULT_PACING,
            driver_update_attempts: 3,
            default_criteria: AssignmentCriteria::default(),
            default_location: GeoPoint::NAIROBI_CBD,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let default_criteria = AssignmentCriteria {
            max_distance_km: parse_or_default(
                "MAX_DISTANCE_KM",
                defaults.default_criteria.max_distance_km,
            )?,
            min_rating: parse_or_default("MIN_RATING", defaults.default_criteria.min_rating)?,
            max_active_orders: parse_or_default(
                "MAX_ACTIVE_ORDERS",
                defaults.default_criteria.max_active_orders,
            )?,
            ..defaults.default_criteria
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            batch_pacing: Duration::from_millis(parse_or_default(
                "BATCH_PACING_MS",
                defaults.batch_pacing.as_millis() as u64,
            )?),
            driver_update_attempts: parse_or_default(
                "DRIVER_UPDATE_ATTEMPTS",
                defaults.driver_update_attempts,
            )?,
            default_criteria,
            default_location: GeoPoint {
                lat: parse_or_default("DEFAULT_LAT", defaults.default_location.lat)?,
                lng: parse_or_default("DEFAULT_LNG", defaults.default_location.lng)?,
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
