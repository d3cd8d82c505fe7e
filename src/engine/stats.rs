use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Months, TimeZone, Utc};
use tracing::warn;

use crate::error::StoreError;
use crate::models::assignment::{
    AssignmentAttempt, AssignmentRecord, DriverAssignmentCount, StatsPeriod, StatsSummary,
};
use crate::store::AssignmentLedger;

const TOP_DRIVERS: usize = 5;

pub struct AssignmentStats {
    ledger: Arc<dyn AssignmentLedger>,
}

impl AssignmentStats {
    pub fn new(ledger: Arc<dyn AssignmentLedger>) -> Self {
        Self { ledger }
    }

    /// Summary of assignments since the start of `period`. Ledger failures
    /// yield an empty summary.
    pub async fn get_stats(&self, period: StatsPeriod) -> StatsSummary {
        match self.collect(period).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(period = ?period, error = %err, "failed to load assignment stats");
                StatsSummary::empty(period)
            }
        }
    }

    async fn collect(&self, period: StatsPeriod) -> Result<StatsSummary, StoreError> {
        let since = period_start(period, Local::now());
        let records = self.ledger.records_since(since).await?;
        let attempts = self.ledger.attempts_since(since).await?;
        Ok(summarize(period, &records, &attempts))
    }
}

/// Local midnight for `Today`, seven days back for `Week`, one calendar
/// month back for `Month`.
pub fn period_start<Tz: TimeZone>(period: StatsPeriod, now: DateTime<Tz>) -> DateTime<Utc> {
    let start = match period {
        StatsPeriod::Today => now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(now.timezone()).earliest())
            .unwrap_or_else(|| now.clone() - Duration::hours(24)),
        StatsPeriod::Week => now.clone() - Duration::days(7),
        StatsPeriod::Month => now
            .clone()
            .checked_sub_months(Months::new(1))
            .unwrap_or_else(|| now.clone() - Duration::days(30)),
    };
    start.with_timezone(&Utc)
}

pub fn summarize(
    period: StatsPeriod,
    records: &[AssignmentRecord],
    attempts: &[AssignmentAttempt],
) -> StatsSummary {
    let mut per_driver: HashMap<_, usize> = HashMap::new();
    for record in records {
        *per_driver.entry(record.driver_id).or_default() += 1;
    }

    let mut top_drivers: Vec<DriverAssignmentCount> = per_driver
        .into_iter()
        .map(|(driver_id, assignments)| DriverAssignmentCount {
            driver_id,
            assignments,
        })
        .collect();
    top_drivers.sort_by(|a, b| {
        b.assignments
            .cmp(&a.assignments)
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });
    top_drivers.truncate(TOP_DRIVERS);

    let waits: Vec<f64> = records
        .iter()
        .filter_map(|record| {
            record
                .order_created_at
                .map(|created| (record.timestamp - created).num_seconds() as f64 / 60.0)
        })
        .collect();
    let average_assignment_time_minutes =
        (!waits.is_empty()).then(|| waits.iter().sum::<f64>() / waits.len() as f64);

    let success_rate = (!attempts.is_empty()).then(|| {
        let successes = attempts.iter().filter(|attempt| attempt.success).count();
        successes as f64 / attempts.len() as f64
    });

    StatsSummary {
        period,
        total_assignments: records.len(),
        average_assignment_time_minutes,
        success_rate,
        top_drivers,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::{period_start, summarize};
    use crate::models::assignment::{
        AssignmentAttempt, AssignmentCriteria, AssignmentRecord, StatsPeriod,
    };

    fn record(driver_seed: u128, wait_minutes: Option<i64>) -> AssignmentRecord {
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        AssignmentRecord {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            driver_id: Uuid::from_u128(driver_seed),
            criteria: AssignmentCriteria::default(),
            distance_km: None,
            score: None,
            score_breakdown: None,
            order_created_at: wait_minutes.map(|m| timestamp - Duration::minutes(m)),
            timestamp,
        }
    }

    fn attempt(success: bool) -> AssignmentAttempt {
        AssignmentAttempt {
            order_id: Uuid::new_v4(),
            success,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn period_starts() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 15, 45, 0).unwrap();

        assert_eq!(
            period_start(StatsPeriod::Today, now),
            Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap()
        );
        assert_eq!(
            period_start(StatsPeriod::Week, now),
            Utc.with_ymd_and_hms(2026, 3, 24, 15, 45, 0).unwrap()
        );
        // February has no 31st; chrono clamps to the last day.
        assert_eq!(
            period_start(StatsPeriod::Month, now),
            Utc.with_ymd_and_hms(2026, 2, 28, 15, 45, 0).unwrap()
        );
    }

    #[test]
    fn top_drivers_are_counted_sorted_and_capped() {
        let mut records = Vec::new();
        for (seed, count) in [(1, 2), (2, 5), (3, 1), (4, 3), (5, 3), (6, 4), (7, 1)] {
            for _ in 0..count {
                records.push(record(seed, None));
            }
        }

        let summary = summarize(StatsPeriod::Week, &records, &[]);

        assert_eq!(summary.total_assignments, 19);
        let top: Vec<(u128, usize)> = summary
            .top_drivers
            .iter()
            .map(|d| (d.driver_id.as_u128(), d.assignments))
            .collect();
        assert_eq!(top, vec![(2, 5), (6, 4), (4, 3), (5, 3), (1, 2)]);
    }

    #[test]
    fn averages_only_records_with_creation_time() {
        let records = vec![record(1, Some(10)), record(1, Some(20)), record(2, None)];
        let summary = summarize(StatsPeriod::Today, &records, &[]);
        assert_eq!(summary.average_assignment_time_minutes, Some(15.0));
    }

    #[test]
    fn success_rate_comes_from_tracked_attempts() {
        let attempts = vec![attempt(true), attempt(false), attempt(true), attempt(true)];
        let summary = summarize(StatsPeriod::Today, &[], &attempts);
        assert_eq!(summary.success_rate, Some(0.75));
    }

    #[test]
    fn empty_history_leaves_rates_unset() {
        let summary = summarize(StatsPeriod::Month, &[], &[]);
        assert_eq!(summary.total_assignments, 0);
        assert!(summary.average_assignment_time_minutes.is_none());
        assert!(summary.success_rate.is_none());
        assert!(summary.top_drivers.is_empty());
    }
}
