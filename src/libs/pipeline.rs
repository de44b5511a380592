//! End-to-end run: report discovery, job fan-out, resolution and tables.
//!
//! ```text
//! list_reports ─▶ select_best_per_date ─▶ build_jobs ─▶ worker pool
//!                                                          │
//!            tables ◀── build_tables ◀── ConflictResolver ◀┘
//! ```
//!
//! A run is a pure function of its [`RunConfig`] and the answers of the
//! [`LogSource`]; nothing is persisted between runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raidtally::libs::pipeline::{run, RunConfig};
//! use raidtally::libs::target::Target;
//! use std::sync::Arc;
//!
//! let config = RunConfig::new(260153, start, end, vec![Target::all_abilities("Fractillus", 3135)]);
//! let output = run(Arc::new(client), &config, |p| println!("{}/{}", p.completed, p.total)).await?;
//! ```

use crate::api::{LogSource, LogSourceError};
use crate::libs::buckets::select_best_per_date;
use crate::libs::config::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_WORKERS};
use crate::libs::jobs::{build_jobs, spawn_workers, with_timeout, JobProgress, JobSettings};
use crate::libs::matrix::{build_tables, Matrix};
use crate::libs::report::Report;
use crate::libs::resolver::ConflictResolver;
use crate::libs::summary::{summarize_boss, BossSummary};
use crate::libs::target::{Metric, MetricSelection, Target, MYTHIC};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("no reports found for guild {guild_id} between {start} and {end}")]
    NoReports { guild_id: u64, start: DateTime<Utc>, end: DateTime<Utc> },

    #[error("no boss/ability targets configured")]
    NoTargets,

    #[error("could not parse a guild id from '{0}', expected something like https://www.warcraftlogs.com/guild/id/260153")]
    MalformedGuild(String),

    #[error("failed to list reports for guild {guild_id}")]
    ReportListing {
        guild_id: u64,
        #[source]
        source: LogSourceError,
    },
}

/// Immutable parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub guild_id: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub targets: Vec<Target>,
    pub difficulty: u32,
    /// Ignore events after the Nth player death of each pull.
    pub cutoff: Option<u32>,
    pub metrics: MetricSelection,
    pub wipes_only: bool,
    pub workers: usize,
    pub call_timeout: Duration,
}

impl RunConfig {
    /// Mythic deaths with the default pool size and call timeout.
    pub fn new(guild_id: u64, start: DateTime<Utc>, end: DateTime<Utc>, targets: Vec<Target>) -> Self {
        Self {
            guild_id,
            start,
            end,
            targets,
            difficulty: MYTHIC,
            cutoff: None,
            metrics: MetricSelection::default(),
            wipes_only: false,
            workers: DEFAULT_WORKERS,
            call_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    fn job_settings(&self) -> JobSettings {
        JobSettings {
            difficulty: self.difficulty,
            cutoff: self.cutoff,
            wipes_only: self.wipes_only,
            workers: self.workers,
            call_timeout: self.call_timeout,
        }
    }
}

/// Tables of one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTables {
    pub metric: Metric,
    /// Keyed by target index; targets without data are absent.
    pub tables: BTreeMap<usize, Matrix>,
    /// Every player seen in a result with pulls, including results that
    /// lost their (target, date) slot to another report.
    pub all_players: BTreeSet<String>,
    /// Number of distinct (target, date) entries that were resolved.
    pub resolved_entries: usize,
}

impl MetricTables {
    pub fn summary(&self, boss_id: u32) -> Option<BossSummary> {
        summarize_boss(&self.tables, boss_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub reports_listed: usize,
    pub dates_selected: usize,
    pub jobs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub selected: Vec<(NaiveDate, Report)>,
    pub metrics: Vec<MetricTables>,
    /// Report codes that won at least one (target, date) slot.
    pub reports_used: BTreeSet<String>,
    pub stats: RunStats,
}

impl RunOutput {
    pub fn tables(&self, metric: Metric) -> Option<&MetricTables> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    /// `true` when no metric produced a single table.
    pub fn is_empty(&self) -> bool {
        self.metrics.iter().all(|m| m.tables.is_empty())
    }
}

/// Executes a run against `source`.
///
/// `on_progress` is called once per finished job with the number of jobs
/// completed so far.
///
/// # Errors
///
/// Fails only when nothing can be computed: no targets, a failed report
/// listing, or no reports in the window. Individual job failures degrade
/// that job and never abort the run.
pub async fn run(source: Arc<dyn LogSource>, config: &RunConfig, mut on_progress: impl FnMut(&JobProgress)) -> Result<RunOutput, RunError> {
    if config.targets.is_empty() {
        return Err(RunError::NoTargets);
    }

    tracing::info!(guild_id = config.guild_id, start = %config.start, end = %config.end, "listing reports");
    let reports = with_timeout(config.call_timeout, source.list_reports(config.guild_id, config.start, config.end))
        .await
        .map_err(|source| RunError::ReportListing {
            guild_id: config.guild_id,
            source,
        })?;
    if reports.is_empty() {
        return Err(RunError::NoReports {
            guild_id: config.guild_id,
            start: config.start,
            end: config.end,
        });
    }

    let selected = select_best_per_date(&reports);
    let metrics = config.metrics.metrics();
    let jobs = build_jobs(&selected, &config.targets, &metrics);
    let stats = RunStats {
        reports_listed: reports.len(),
        dates_selected: selected.len(),
        jobs: jobs.len(),
    };
    tracing::info!(reports = stats.reports_listed, dates = stats.dates_selected, jobs = stats.jobs, workers = config.workers, "starting jobs");

    let total = jobs.len();
    let (mut workers, mut results) = spawn_workers(source, jobs, config.job_settings());

    let mut resolvers: HashMap<Metric, ConflictResolver> = metrics.iter().map(|m| (*m, ConflictResolver::new())).collect();
    let mut completed = 0;
    while let Some(result) = results.recv().await {
        completed += 1;
        tracing::debug!(
            report = %result.report_code,
            target = result.target_index,
            date = %result.date,
            pulls = result.num_pulls,
            total = result.total_metric,
            "job finished"
        );
        resolvers.entry(result.metric).or_default().accept(result);
        on_progress(&JobProgress { completed, total });
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "worker task ended abnormally");
        }
    }

    let mut reports_used = BTreeSet::new();
    let mut tables = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let resolver = resolvers.remove(&metric).unwrap_or_default();
        reports_used.extend(resolver.reports_used());
        tables.push(MetricTables {
            metric,
            tables: build_tables(&resolver, &config.targets, metric),
            all_players: resolver.all_players().clone(),
            resolved_entries: resolver.len(),
        });
    }

    tracing::info!(reports_used = reports_used.len(), "run finished");
    Ok(RunOutput {
        selected,
        metrics: tables,
        reports_used,
        stats,
    })
}
