use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::assignment::{
    AssignmentRecord, BatchReport, CriteriaOverrides, StatsPeriod, StatsSummary,
};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assignments", get(list_assignments))
        .route("/assignments/batch", post(batch_assign))
        .route("/assignments/stats", get(assignment_stats))
}

#[derive(Deserialize)]
pub struct BatchAssignRequest {
    pub order_ids: Vec<Uuid>,
    #[serde(default)]
    pub criteria: Option<CriteriaOverrides>,
}

#[derive(Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub period: StatsPeriod,
}

async fn list_assignments(State(state): State<Arc<AppState>>) -> Json<Vec<AssignmentRecord>> {
    Json(state.store.all_records())
}

async fn batch_assign(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchAssignRequest>,
) -> Json<BatchReport> {
    let report = state
        .batch
        .batch_assign(&payload.order_ids, payload.criteria)
        .await;
    Json(report)
}

async fn assignment_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Json<StatsSummary> {
    Json(state.stats.get_stats(query.period).await)
}
