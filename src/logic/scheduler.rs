use super::{AlertEvaluator, AlertKey, AlertLog};
use crate::datasources::StationFeed;
use crate::error::{BikeAlertError, Result};
use crate::models::{Job, StationRecord};
use crate::notify::Notifier;
use chrono::{Local, NaiveDateTime};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started, or stopped by shutdown.
    Idle,
    /// Waiting for the next tick.
    Armed,
    /// Executing a cycle.
    Running,
}

/// Outcome of one refresh-and-evaluate cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub stations: usize,
    pub jobs_evaluated: usize,
    pub skipped_jobs: Vec<String>,
    pub alerts_sent: Vec<AlertKey>,
    pub failed_deliveries: Vec<AlertKey>,
}

/// The recurring alert loop.
///
/// Owns the [`AlertLog`] for its whole lifetime; that continuity across
/// cycles is what keeps each (station, condition) alert to a single email.
/// Cycles run one at a time on the calling task, jobs in configuration
/// order, deliveries awaited one by one.
pub struct AlertScheduler<F, N> {
    feed: F,
    notifier: N,
    jobs: Vec<Job>,
    evaluator: AlertEvaluator,
    alert_log: AlertLog,
    snapshot: Vec<StationRecord>,
    interval: Duration,
    state: SchedulerState,
}

impl<F: StationFeed, N: Notifier> AlertScheduler<F, N> {
    pub fn new(feed: F, notifier: N, jobs: Vec<Job>, interval: Duration) -> Self {
        Self {
            feed,
            notifier,
            jobs,
            evaluator: AlertEvaluator::new(),
            alert_log: AlertLog::new(),
            snapshot: Vec::new(),
            interval,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn alert_log(&self) -> &AlertLog {
        &self.alert_log
    }

    pub fn snapshot(&self) -> &[StationRecord] {
        &self.snapshot
    }

    /// Run cycles until `shutdown` resolves.
    ///
    /// The first cycle starts one interval after the call. Each later cycle
    /// is due one interval after the previous one was due, so a slow cycle
    /// shortens the following wait instead of pushing the schedule back.
    pub async fn run_until<S: Future<Output = ()>>(&mut self, shutdown: S) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        tokio::pin!(shutdown);

        self.state = SchedulerState::Armed;
        tracing::info!(
            jobs = self.jobs.len(),
            interval_secs = self.interval.as_secs(),
            "alert loop armed"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping alert loop");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let now = Local::now().naive_local();
            match self.run_cycle(now).await {
                Ok(report) => tracing::debug!(
                    stations = report.stations,
                    jobs = report.jobs_evaluated,
                    sent = report.alerts_sent.len(),
                    skipped = report.skipped_jobs.len(),
                    failed = report.failed_deliveries.len(),
                    "cycle complete"
                ),
                Err(e) => tracing::warn!("cycle skipped: {}", e),
            }
        }

        self.state = SchedulerState::Idle;
    }

    /// Refresh the snapshot and evaluate every job against it at `now`.
    ///
    /// Only a feed failure fails the cycle. An unknown station skips its
    /// job; a failed delivery is reported and left unsent so the next cycle
    /// tries again.
    pub async fn run_cycle(&mut self, now: NaiveDateTime) -> Result<CycleReport> {
        self.state = SchedulerState::Running;
        let result = self.execute_cycle(now).await;
        self.state = SchedulerState::Armed;
        result
    }

    async fn execute_cycle(&mut self, now: NaiveDateTime) -> Result<CycleReport> {
        self.snapshot = self.feed.refresh().await?;

        let mut report = CycleReport {
            stations: self.snapshot.len(),
            ..Default::default()
        };

        for job in &self.jobs {
            let evaluated = self
                .evaluator
                .evaluate(job, &self.snapshot, now, &mut self.alert_log);

            let pending = match evaluated {
                Ok(pending) => pending,
                Err(BikeAlertError::UnknownStation(code)) => {
                    tracing::warn!(station = %code, "station not in feed, skipping job");
                    report.skipped_jobs.push(code);
                    continue;
                }
                Err(e) => return Err(e),
            };
            report.jobs_evaluated += 1;

            for item in pending {
                match self.notifier.send(&item.alert).await {
                    Ok(()) => {
                        self.alert_log.mark_sent(item.key.clone());
                        report.alerts_sent.push(item.key);
                    }
                    Err(e) => {
                        tracing::error!(
                            key = %item.key,
                            channel = self.notifier.channel_name(),
                            "alert delivery failed: {}",
                            e
                        );
                        report.failed_deliveries.push(item.key);
                    }
                }
            }
        }

        Ok(report)
    }
}
