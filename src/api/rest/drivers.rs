use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{patch, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus, GeoPoint, VehicleType};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(create_driver).get(list_drivers))
        .route("/drivers/:id/status", patch(update_driver_status))
        .route("/drivers/:id/location", patch(update_driver_location))
}

#[derive(Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub vehicle_type: VehicleType,
    pub rating: f64,
    #[serde(default)]
    pub total_deliveries: u32,
    pub completion_rate: Option<f64>,
    pub current_location: Option<GeoPoint>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DriverStatus,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDriverRequest>,
) -> Result<Json<Driver>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let driver = Driver {
        id: Uuid::new_v4(),
        name: payload.name,
        status: DriverStatus::Available,
        rating: payload.rating.clamp(0.0, 5.0),
        total_deliveries: payload.total_deliveries,
        completion_rate: payload.completion_rate.map(|rate| rate.clamp(0.0, 1.0)),
        current_location: payload.current_location,
        vehicle_type: payload.vehicle_type,
        updated_at: Utc::now(),
    };

    state.store.insert_driver(driver.clone());
    Ok(Json(driver))
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Driver>> {
    let mut drivers: Vec<Driver> = state
        .store
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    drivers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Json(drivers)
}

async fn update_driver_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Driver>, AppError> {
    let mut driver = state
        .store
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {} not found", id)))?;

    driver.status = payload.status;
    driver.updated_at = Utc::now();

    Ok(Json(driver.clone()))
}

async fn update_driver_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Driver>, AppError> {
    let mut driver = state
        .store
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {} not found", id)))?;

    driver.current_location = Some(payload.location);
    driver.updated_at = Utc::now();

    Ok(Json(driver.clone()))
}
