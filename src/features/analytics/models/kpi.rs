use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::features::reports::models::{Report, ReportCategory};
use crate::shared::constants::MONTHLY_REPORT_PREFIX;

/// Stored overall summary record
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct KpiSummary {
    pub id: String,
    pub total_reports: i64,
    pub total_resolved: i64,
    /// Percentage, two decimals
    pub resolution_rate: Decimal,
    /// Not written by the daily recomputation
    pub avg_cycle_time_hours: Option<Decimal>,
    pub active_worker_count: Option<i64>,
    pub last_updated: DateTime<Utc>,
}

/// Per-month partition of the report set
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MonthlyReport {
    pub id: String,
    /// `YYYYMM`
    pub period: i32,
    pub reports_submitted: i64,
    pub reports_resolved: i64,
    pub category_counts: Json<BTreeMap<String, i64>>,
    pub avg_priority: Decimal,
    pub last_updated: DateTime<Utc>,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `round2(resolved / total * 100)`, or 0 for an empty report set
pub fn resolution_rate(total: i64, resolved: i64) -> Decimal {
    if total <= 0 {
        return Decimal::ZERO;
    }
    round2(Decimal::from(resolved) * Decimal::ONE_HUNDRED / Decimal::from(total))
}

pub fn period_of(at: DateTime<Utc>) -> i32 {
    at.year() * 100 + at.month() as i32
}

#[derive(Default)]
struct PeriodTally {
    submitted: i64,
    resolved: i64,
    priority_sum: i64,
    categories: BTreeMap<String, i64>,
}

/// Bucket reports by period.
///
/// Submissions and category counts follow `created_at`; resolutions follow
/// `resolved_at`, so a report created in March and resolved in April counts
/// toward both months. Results are ordered by period.
pub fn monthly_reports(reports: &[Report], now: DateTime<Utc>) -> Vec<MonthlyReport> {
    let mut tallies: BTreeMap<i32, PeriodTally> = BTreeMap::new();

    for report in reports {
        let created = tallies.entry(period_of(report.created_at)).or_default();
        created.submitted += 1;
        created.priority_sum += i64::from(report.priority.value());
        *created
            .categories
            .entry(report.category.label().to_string())
            .or_default() += 1;

        if let Some(resolved_at) = report.resolved_at {
            tallies.entry(period_of(resolved_at)).or_default().resolved += 1;
        }
    }

    tallies
        .into_iter()
        .map(|(period, tally)| {
            let mut category_counts: BTreeMap<String, i64> = ReportCategory::ALL
                .iter()
                .map(|c| (c.label().to_string(), 0))
                .collect();
            category_counts.extend(tally.categories);

            let avg_priority = if tally.submitted == 0 {
                Decimal::ZERO
            } else {
                round2(Decimal::from(tally.priority_sum) / Decimal::from(tally.submitted))
            };

            MonthlyReport {
                id: format!("{}{}", MONTHLY_REPORT_PREFIX, period),
                period,
                reports_submitted: tally.submitted,
                reports_resolved: tally.resolved,
                category_counts: Json(category_counts),
                avg_priority,
                last_updated: now,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{Priority, ReportStatus};
    use crate::shared::test_helpers::{fixed_now, sample_report};
    use chrono::TimeZone;

    #[test]
    fn test_resolution_rate() {
        assert_eq!(resolution_rate(10, 4), Decimal::new(4000, 2));
        assert_eq!(resolution_rate(0, 0), Decimal::ZERO);
        assert_eq!(resolution_rate(3, 1), Decimal::new(3333, 2));
        assert_eq!(resolution_rate(3, 2), Decimal::new(6667, 2));
        assert_eq!(resolution_rate(8, 8), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_period_of() {
        let at = Utc.with_ymd_and_hms(2024, 11, 30, 23, 59, 59).unwrap();
        assert_eq!(period_of(at), 202411);
        assert_eq!(period_of(fixed_now()), 202503);
    }

    #[test]
    fn test_monthly_reports_bucket_by_creation_and_resolution() {
        let march = fixed_now();
        let april = Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap();

        let mut a = sample_report("citizen-1");
        a.priority = Priority::new(5).unwrap();
        a.category = ReportCategory::EmergencyCleanup;

        let mut b = sample_report("citizen-2");
        b.priority = Priority::new(2).unwrap();
        b.status = ReportStatus::Resolved;
        b.assigned_to_id = Some("worker-1".into());
        b.resolved_at = Some(april);

        let mut c = sample_report("citizen-3");
        c.created_at = april;

        let reports = monthly_reports(&[a, b, c], march);
        assert_eq!(reports.len(), 2);

        let m = &reports[0];
        assert_eq!(m.id, "monthly_report_202503");
        assert_eq!(m.period, 202503);
        assert_eq!(m.reports_submitted, 2);
        assert_eq!(m.reports_resolved, 0);
        assert_eq!(m.avg_priority, Decimal::new(350, 2));
        assert_eq!(m.category_counts.0.len(), 5);
        assert_eq!(m.category_counts.0["Emergency Cleanup"], 1);
        assert_eq!(m.category_counts.0["Other"], 1);
        assert_eq!(m.category_counts.0["Illegal Dumping"], 0);

        let a = &reports[1];
        assert_eq!(a.period, 202504);
        assert_eq!(a.reports_submitted, 1);
        assert_eq!(a.reports_resolved, 1);
        assert_eq!(a.avg_priority, Decimal::ONE);
    }

    #[test]
    fn test_resolution_only_month_has_zero_average() {
        let mut report = sample_report("citizen-1");
        report.status = ReportStatus::Resolved;
        report.resolved_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());

        let reports = monthly_reports(&[report], fixed_now());
        let june = reports.iter().find(|r| r.period == 202506).unwrap();
        assert_eq!(june.reports_submitted, 0);
        assert_eq!(june.reports_resolved, 1);
        assert_eq!(june.avg_priority, Decimal::ZERO);
        assert!(june.category_counts.0.values().all(|n| *n == 0));
    }

    #[test]
    fn test_no_reports_no_months() {
        assert!(monthly_reports(&[], fixed_now()).is_empty());
    }
}
