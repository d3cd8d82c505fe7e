use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by an order/driver/ledger/notification collaborator.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("Order not found")]
    OrderNotFound(Uuid),

    #[error("Driver not found")]
    DriverNotFound(Uuid),

    #[error("Driver is offline")]
    DriverOffline(Uuid),

    #[error("No suitable drivers available")]
    NoEligibleDriver,

    #[error("Could not determine order location")]
    LocationUnresolvable,

    #[error("order {order_id} confirmed but driver {driver_id} not marked busy: {reason}")]
    PartialCommit {
        order_id: Uuid,
        driver_id: Uuid,
        reason: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Unavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        let message = err.to_string();
        match err {
            AssignmentError::OrderNotFound(_) | AssignmentError::DriverNotFound(_) => {
                AppError::NotFound(message)
            }
            AssignmentError::DriverOffline(_) => AppError::BadRequest(message),
            AssignmentError::Store(inner) => inner.into(),
            _ => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
