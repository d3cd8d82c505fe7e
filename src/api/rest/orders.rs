use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::matcher::Candidate;
use crate::error::AppError;
use crate::models::assignment::{AssignmentOutcome, CriteriaOverrides};
use crate::models::driver::EligibilityMode;
use crate::models::order::Order;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/candidates", get(list_candidates))
        .route("/orders/:id/assign", post(assign_order))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub address: String,
}

#[derive(Deserialize, Default)]
pub struct AssignOrderRequest {
    #[serde(default)]
    pub criteria: Option<CriteriaOverrides>,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest("address cannot be empty".to_string()));
    }

    let order = Order::new(payload.customer_name, payload.address);
    state.store.insert_order(order.clone());

    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order.value().clone()))
}

/// Dispatch pool for manual assignment: busy drivers are included.
async fn list_candidates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    let location = state.matcher.order_location(id).await?;
    let criteria = state.matcher.criteria_with(Some(CriteriaOverrides {
        eligibility: Some(EligibilityMode::NotOffline),
        ..CriteriaOverrides::default()
    }));

    let candidates = state.matcher.rank_drivers(&location, &criteria).await?;
    Ok(Json(candidates))
}

async fn assign_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignOrderRequest>,
) -> Json<AssignmentOutcome> {
    let outcome = match payload.driver_id {
        Some(driver_id) => {
            state
                .matcher
                .assign_order_to_specific_driver(id, driver_id)
                .await
        }
        None => {
            state
                .matcher
                .assign_order_to_driver(id, payload.criteria)
                .await
        }
    };

    Json(outcome)
}
