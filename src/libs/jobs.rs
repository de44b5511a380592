//! Fan-out of (date × target × metric) jobs over a fixed worker pool.
//!
//! Every job performs two log source calls: the per-player metric rows and
//! the fight list used to count pulls. Jobs never fail. A failing or
//! timed-out call degrades the job to empty rows and zero pulls, which the
//! resolver drops, and is logged as a warning.
//!
//! ## Execution model
//!
//! ```text
//!   VecDeque<Job> ──┬── worker 1 ──┐
//!  (shared, locked) ├── worker 2 ──┼──▶ mpsc ──▶ single consumer
//!                   └── worker N ──┘
//! ```
//!
//! Workers are tokio tasks on the multi-thread runtime. The queue lock is
//! only held to pop the next job, never across an await.

use crate::api::{LogSource, LogSourceError};
use crate::libs::report::Report;
use crate::libs::target::{Metric, MetricQuery, Target};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// One unit of work: a report standing in for a date, one target, one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub date: NaiveDate,
    pub report_code: String,
    pub target_index: usize,
    pub target: Target,
    pub metric: Metric,
}

/// Outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub date: NaiveDate,
    pub report_code: String,
    pub target_index: usize,
    pub metric: Metric,
    /// Sum of all values in `player_counts`.
    pub total_metric: i64,
    pub player_counts: HashMap<String, i64>,
    pub num_pulls: usize,
}

impl JobResult {
    /// Reduces rows into per-player values, summing duplicate player rows.
    pub fn from_rows(job: &Job, rows: impl IntoIterator<Item = (String, i64)>, num_pulls: usize) -> Self {
        let mut player_counts: HashMap<String, i64> = HashMap::new();
        for (player, value) in rows {
            *player_counts.entry(player).or_insert(0) += value;
        }
        let total_metric = player_counts.values().sum();

        Self {
            date: job.date,
            report_code: job.report_code.clone(),
            target_index: job.target_index,
            metric: job.metric,
            total_metric,
            player_counts,
            num_pulls,
        }
    }
}

/// Parameters shared by every job of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    pub difficulty: u32,
    pub cutoff: Option<u32>,
    pub wipes_only: bool,
    pub workers: usize,
    pub call_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgress {
    pub completed: usize,
    pub total: usize,
}

/// Expands the selected reports into jobs, date-major, then target order,
/// then metric order.
pub fn build_jobs(selected: &[(NaiveDate, Report)], targets: &[Target], metrics: &[Metric]) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(selected.len() * targets.len() * metrics.len());
    for (date, report) in selected {
        for (target_index, target) in targets.iter().enumerate() {
            for metric in metrics {
                jobs.push(Job {
                    date: *date,
                    report_code: report.code.clone(),
                    target_index,
                    target: target.clone(),
                    metric: *metric,
                });
            }
        }
    }
    jobs
}

/// Runs `fut`, turning an elapsed deadline into [`LogSourceError::Timeout`].
pub async fn with_timeout<T>(limit: Duration, fut: impl Future<Output = Result<T, LogSourceError>>) -> Result<T, LogSourceError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(LogSourceError::Timeout(limit.as_secs())),
    }
}

/// Executes a single job against the log source.
///
/// Any failed call degrades the whole job to zero rows and zero pulls.
pub async fn run_job(source: &dyn LogSource, job: &Job, settings: &JobSettings) -> JobResult {
    match fetch_job(source, job, settings).await {
        Ok((rows, num_pulls)) => JobResult::from_rows(job, rows, num_pulls),
        Err(e) => {
            tracing::warn!(
                report = %job.report_code,
                boss = %job.target.boss_name,
                ability_id = ?job.target.ability_id,
                metric = job.metric.slug(),
                error = %e,
                "job degraded to an empty result"
            );
            JobResult::from_rows(job, Vec::new(), 0)
        }
    }
}

async fn fetch_job(source: &dyn LogSource, job: &Job, settings: &JobSettings) -> Result<(Vec<(String, i64)>, usize), LogSourceError> {
    let query = MetricQuery {
        report_code: job.report_code.clone(),
        boss_id: job.target.boss_id,
        ability_id: job.target.ability_id,
        difficulty: settings.difficulty,
        cutoff: settings.cutoff,
        metric: job.metric,
        wipes_only: settings.wipes_only,
    };

    let rows = with_timeout(settings.call_timeout, source.metric_rows(&query)).await?;
    let fights = with_timeout(settings.call_timeout, source.list_fights(&job.report_code, job.target.boss_id, settings.difficulty)).await?;
    let num_pulls = fights.iter().filter(|f| !settings.wipes_only || !f.kill).count();

    Ok((rows.into_iter().map(|r| (r.player, r.value)).collect(), num_pulls))
}

/// Starts the worker pool and returns the receiving end of the results
/// channel.
///
/// The channel closes once every job has been processed and all workers
/// have exited, so the consumer can simply drain it.
pub fn spawn_workers(source: Arc<dyn LogSource>, jobs: Vec<Job>, settings: JobSettings) -> (JoinSet<()>, mpsc::UnboundedReceiver<JobResult>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker_count = settings.workers.max(1).min(jobs.len().max(1));
    let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
    let settings = Arc::new(settings);

    let mut workers = JoinSet::new();
    for worker in 0..worker_count {
        let queue = Arc::clone(&queue);
        let source = Arc::clone(&source);
        let settings = Arc::clone(&settings);
        let tx = tx.clone();

        workers.spawn(async move {
            loop {
                let next = queue.lock().pop_front();
                let Some(job) = next else {
                    break;
                };

                let result = run_job(source.as_ref(), &job, &settings).await;
                if tx.send(result).is_err() {
                    // consumer is gone
                    break;
                }
            }
            tracing::debug!(worker, "worker finished");
        });
    }

    (workers, rx)
}
