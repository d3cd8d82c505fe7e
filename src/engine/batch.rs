use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

use crate::engine::matcher::AssignmentMatcher;
use crate::models::assignment::{BatchItemResult, BatchReport, CriteriaOverrides};

pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Assigns many orders one after another.
///
/// Orders are never processed concurrently so each attempt sees the driver
/// loads committed by the previous one.
pub struct BatchCoordinator {
    matcher: Arc<AssignmentMatcher>,
    pacing: Duration,
}

impl BatchCoordinator {
    pub fn new(matcher: Arc<AssignmentMatcher>, pacing: Duration) -> Self {
        Self { matcher, pacing }
    }

    pub async fn batch_assign(
        &self,
        order_ids: &[Uuid],
        overrides: Option<CriteriaOverrides>,
    ) -> BatchReport {
        let mut report = BatchReport {
            results: Vec::with_capacity(order_ids.len()),
            ..BatchReport::default()
        };

        for (index, order_id) in order_ids.iter().copied().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                sleep(self.pacing).await;
            }

            let outcome = self
                .matcher
                .assign_order_to_driver(order_id, overrides.clone())
                .await;

            if outcome.success {
                report.successful += 1;
            } else {
                report.failed += 1;
            }

            report.results.push(BatchItemResult {
                order_id,
                success: outcome.success,
                driver_id: outcome.assigned_driver.map(|driver| driver.id),
                error: outcome.error,
            });
        }

        info!(
            total = order_ids.len(),
            successful = report.successful,
            failed = report.failed,
            "batch assignment finished"
        );

        report
    }
}
