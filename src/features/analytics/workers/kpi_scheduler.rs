use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::core::config::SchedulerConfig;
use crate::features::analytics::services::KpiService;
use crate::shared::clock::Clock;

/// First `hour:minute` (UTC) strictly after `now`
pub fn next_run_after(now: DateTime<Utc>, hour: u32, minute: u32) -> DateTime<Utc> {
    let at = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Daily KPI recomputation worker
pub struct KpiScheduler {
    service: Arc<KpiService>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl KpiScheduler {
    pub fn new(service: Arc<KpiService>, clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        Self {
            service,
            clock,
            config,
        }
    }

    pub async fn run(&self) {
        tracing::info!(
            "Starting KPI scheduler (daily at {:02}:{:02} UTC)",
            self.config.hour,
            self.config.minute
        );

        loop {
            let now = self.clock.now();
            let next = next_run_after(now, self.config.hour, self.config.minute);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!("Next KPI recomputation at {}", next);

            tokio::time::sleep(wait).await;
            self.run_once().await;
        }
    }

    /// Summary first, then monthly. A failure is logged and the schedule continues.
    pub async fn run_once(&self) {
        if let Err(e) = self.service.recompute_summary().await {
            tracing::error!("KPI summary recomputation failed: {:?}", e);
        }
        if let Err(e) = self.service.recompute_monthly().await {
            tracing::error!("Monthly KPI recomputation failed: {:?}", e);
        }
    }
}
