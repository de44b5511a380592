//! `raidtally run`: fetch, aggregate, print and optionally export.

use crate::{
    api::{LogSource, WarcraftLogs, WclCredentials},
    libs::{
        bosses::BossCatalog,
        config::Config,
        export::{ExportFormat, ExportTable, Exporter},
        formatter::{ability_caption, export_stem, target_label, TableScope, BOSS_SUMMARY},
        guild::parse_guild_id,
        matrix::Matrix,
        messages::{macros::is_debug_mode, Message},
        pipeline::{run, MetricTables, RunConfig, RunOutput},
        summary::bosses_with_tables,
        target::{MetricSelection, Target},
        view::View,
    },
    msg_bail_anyhow, msg_debug, msg_error_anyhow, msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use chrono::{DateTime, Duration as DateDuration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Number of days covered when `--from` is omitted, including the end date.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Guild URL, e.g. https://www.warcraftlogs.com/guild/id/260153
    #[arg(short, long)]
    guild: Option<String>,

    /// First date (YYYY-MM-DD, UTC). Defaults to six days before --to
    #[arg(long)]
    from: Option<String>,

    /// Last date (YYYY-MM-DD, UTC), inclusive. Defaults to today
    #[arg(long)]
    to: Option<String>,

    /// BOSS, BOSS:ABILITY_ID[,ABILITY_ID...], BOSS:all or BOSS:tracked
    #[arg(short, long = "target", required = true)]
    targets: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = MetricSelection::Deaths)]
    metric: MetricSelection,

    /// Ignore events after the Nth player death of each pull
    #[arg(long)]
    cutoff: Option<u32>,

    /// Raid difficulty id (5 = Mythic)
    #[arg(long)]
    difficulty: Option<u32>,

    /// Only count pulls that ended in a wipe
    #[arg(long)]
    wipes_only: bool,

    /// Number of parallel workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Also print a per-boss summary summing all abilities
    #[arg(long)]
    summary: bool,

    /// Only show players whose name contains this text
    #[arg(short, long)]
    search: Option<String>,

    #[arg(short, long, value_enum)]
    export: Option<ExportFormat>,

    /// Directory for exported files
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn cmd(args: RunArgs) -> Result<()> {
    let config = Config::read()?;
    let defaults = config.defaults();

    let guild_url = match args.guild.clone().or(defaults.guild_url.clone()) {
        Some(url) => url,
        None => msg_bail_anyhow!(Message::GuildUrlMissing),
    };
    let guild_id = parse_guild_id(&guild_url)?;

    let (start, end) = resolve_window(args.from.as_deref(), args.to.as_deref(), Utc::now().date_naive())?;

    let catalog = BossCatalog::read()?;
    let targets = catalog.parse_target_list(&args.targets)?;
    if targets.is_empty() {
        msg_bail_anyhow!(Message::NoTargetsGiven);
    }

    let timeout = Duration::from_secs(args.timeout.unwrap_or(defaults.request_timeout));
    let credentials = WclCredentials::from_env().map_err(|_| msg_error_anyhow!(Message::CredentialsMissing))?;
    let source: Arc<dyn LogSource> = Arc::new(WarcraftLogs::with_settings(config.wcl(), credentials, timeout)?);

    let run_config = RunConfig {
        difficulty: args.difficulty.unwrap_or(defaults.difficulty),
        cutoff: args.cutoff,
        metrics: args.metric,
        wipes_only: args.wipes_only,
        workers: args.workers.unwrap_or(defaults.workers),
        call_timeout: timeout,
        ..RunConfig::new(guild_id, start, end, targets)
    };

    msg_info!(Message::FetchingReports(
        guild_id,
        start.date_naive().to_string(),
        end.date_naive().to_string()
    ));
    let output = run(source, &run_config, |progress| {
        if is_debug_mode() {
            msg_debug!(Message::JobsProgress(progress.completed, progress.total));
        } else {
            eprint!("\r{}", Message::JobsProgress(progress.completed, progress.total));
            if progress.completed == progress.total {
                eprintln!();
            }
            let _ = std::io::stderr().flush();
        }
    })
    .await?;

    report_summary(&output);
    if output.is_empty() {
        msg_warning!(Message::NoDataInRange);
        return Ok(());
    }

    let exporter = args.export.map(|format| Exporter::new(format, args.output.clone()));
    for tables in &output.metrics {
        show_metric(tables, &run_config.targets, &catalog, &args, exporter.as_ref())?;
    }

    Ok(())
}

/// Turns the optional `--from`/`--to` dates into a UTC window covering whole
/// days: `from 00:00:00` to `to 23:59:59`.
pub fn resolve_window(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let to = match to {
        Some(input) => parse_date(input)?,
        None => today,
    };
    let from = match from {
        Some(input) => parse_date(input)?,
        None => to - DateDuration::days(DEFAULT_WINDOW_DAYS - 1),
    };
    if from > to {
        msg_bail_anyhow!(Message::InvalidDateRange(from.to_string(), to.to_string()));
    }

    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    let end = to.and_time(end_of_day).and_utc();
    Ok((start, end))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| msg_error_anyhow!(Message::InvalidDate(input.to_string())))
}

fn report_summary(output: &RunOutput) {
    let rows: usize = output.metrics.iter().map(|m| m.resolved_entries).sum();
    let players: BTreeSet<&String> = output.metrics.iter().flat_map(|m| m.all_players.iter()).collect();
    msg_success!(Message::RunSummary {
        rows,
        players: players.len(),
        reports: output.reports_used.len(),
    });
}

fn show_metric(tables: &MetricTables, targets: &[Target], catalog: &BossCatalog, args: &RunArgs, exporter: Option<&Exporter>) -> Result<()> {
    for (index, target) in targets.iter().enumerate() {
        let ability_name = target.ability_id.and_then(|id| catalog.ability_name(id));
        let label = target_label(target, ability_name);

        let Some(matrix) = tables.tables.get(&index) else {
            msg_warning!(Message::NoDataForTarget(label));
            continue;
        };

        msg_print!(Message::TableHeading(tables.metric.to_string(), label), true);
        let caption = ability_caption(target.ability_id, ability_name);
        show_table(matrix, args.search.as_deref())?;
        if let Some(exporter) = exporter {
            let stem = export_stem(tables.metric, &target.boss_name, TableScope::of(target));
            let path = exporter.export(&ExportTable::from_matrix(matrix, caption), &stem)?;
            msg_success!(Message::ExportCompleted(path.display().to_string()));
        }
    }

    if args.summary {
        for (boss_id, boss_name) in bosses_with_tables(&tables.tables) {
            let Some(summary) = tables.summary(boss_id) else {
                continue;
            };
            msg_print!(Message::SummaryHeading(tables.metric.to_string(), boss_name.clone()), true);
            show_table(&summary.matrix, args.search.as_deref())?;
            if let Some(exporter) = exporter {
                let stem = export_stem(tables.metric, &boss_name, TableScope::Summary);
                let path = exporter.export(&ExportTable::from_matrix(&summary.matrix, BOSS_SUMMARY), &stem)?;
                msg_success!(Message::ExportCompleted(path.display().to_string()));
            }
        }
    }

    Ok(())
}

fn show_table(matrix: &Matrix, search: Option<&str>) -> Result<()> {
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        let needle = search.to_lowercase();
        if !matrix.rows.iter().any(|r| r.player.to_lowercase().contains(&needle)) {
            msg_warning!(Message::NoPlayersMatch(search.to_string()));
            return Ok(());
        }
    }
    View::matrix(matrix, search)?;
    msg_print!(Message::LogLinksHeading);
    View::links(matrix)
}
