#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use parking_lot::Mutex;
    use raidtally::api::{LogSource, LogSourceError};
    use raidtally::libs::jobs::JobProgress;
    use raidtally::libs::pipeline::{run, RunConfig, RunError};
    use raidtally::libs::report::{Fight, MetricRow, Report};
    use raidtally::libs::target::{Metric, MetricQuery, MetricSelection, Target};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const GUILD: u64 = 260153;

    /// In-memory log source keyed by report code.
    #[derive(Default)]
    struct FakeSource {
        reports: Vec<Report>,
        fail_listing: bool,
        fights: HashMap<String, Vec<Fight>>,
        rows: HashMap<(String, Option<u64>, Metric), Vec<MetricRow>>,
        failing: HashSet<String>,
        hanging: HashSet<String>,
        rows_failing: HashSet<String>,
        call_delay: Option<Duration>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        queries: Mutex<Vec<MetricQuery>>,
    }

    impl FakeSource {
        fn report(mut self, code: &str, day: u32, minutes: i64) -> Self {
            let start = Utc.with_ymd_and_hms(2025, 7, day, 19, 0, 0).unwrap();
            self.reports.push(Report {
                code: code.to_string(),
                title: format!("Manaforge Omega {}", code),
                start_time: start,
                end_time: start + chrono::Duration::minutes(minutes),
            });
            self.fights.insert(code.to_string(), vec![fight(1, false), fight(2, false), fight(3, true)]);
            self
        }

        fn rows(mut self, code: &str, ability_id: Option<u64>, metric: Metric, rows: &[(&str, i64)]) -> Self {
            self.rows.insert(
                (code.to_string(), ability_id, metric),
                rows.iter().map(|(p, v)| MetricRow::new(*p, *v)).collect(),
            );
            self
        }

        fn failing(mut self, code: &str) -> Self {
            self.failing.insert(code.to_string());
            self
        }

        /// Only the metric rows call fails; fights still list fine.
        fn rows_failing(mut self, code: &str) -> Self {
            self.rows_failing.insert(code.to_string());
            self
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.call_delay = Some(delay);
            self
        }

        fn hanging(mut self, code: &str) -> Self {
            self.hanging.insert(code.to_string());
            self
        }

        async fn check(&self, code: &str) -> Result<(), LogSourceError> {
            if self.failing.contains(code) {
                return Err(LogSourceError::Connectivity(format!("connection reset while fetching {}", code)));
            }
            if self.hanging.contains(code) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LogSource for FakeSource {
        async fn list_reports(&self, _guild_id: u64, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<Report>, LogSourceError> {
            if self.fail_listing {
                return Err(LogSourceError::Connectivity("dns failure".to_string()));
            }
            Ok(self.reports.clone())
        }

        async fn list_fights(&self, report_code: &str, _boss_id: u32, _difficulty: u32) -> Result<Vec<Fight>, LogSourceError> {
            self.check(report_code).await?;
            Ok(self.fights.get(report_code).cloned().unwrap_or_default())
        }

        async fn metric_rows(&self, query: &MetricQuery) -> Result<Vec<MetricRow>, LogSourceError> {
            self.queries.lock().push(query.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.call_delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.rows_failing.contains(&query.report_code) {
                return Err(LogSourceError::Api(format!("report {} not found", query.report_code)));
            }
            self.check(&query.report_code).await?;
            let key = (query.report_code.clone(), query.ability_id, query.metric);
            Ok(self.rows.get(&key).cloned().unwrap_or_default())
        }
    }

    fn fight(id: u32, kill: bool) -> Fight {
        Fight {
            id,
            kill,
            start_time: id as i64 * 600_000,
            end_time: id as i64 * 600_000 + 300_000,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn config(targets: Vec<Target>) -> RunConfig {
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 7, 7, 23, 59, 59).unwrap();
        let mut config = RunConfig::new(GUILD, start, end, targets);
        config.workers = 3;
        config
    }

    fn salhadaar() -> Target {
        Target::new("Nexus-King Salhadaar", 3134, Some(1227472))
    }

    #[tokio::test]
    async fn test_longest_report_of_the_day_is_used() {
        let source = FakeSource::default()
            .report("A", 2, 20)
            .report("B", 2, 40)
            .rows("A", Some(1227472), Metric::Deaths, &[("Alice", 3), ("Bob", 2)])
            .rows("B", Some(1227472), Metric::Deaths, &[("Alice", 1), ("Bob", 2)]);

        let output = run(Arc::new(source), &config(vec![salhadaar()]), |_| {}).await.unwrap();

        assert_eq!(output.selected.len(), 1);
        assert_eq!(output.selected[0].1.code, "B");
        assert_eq!(output.stats.reports_listed, 2);
        assert_eq!(output.stats.jobs, 1);

        let deaths = output.tables(Metric::Deaths).unwrap();
        let matrix = &deaths.tables[&0];
        assert_eq!(matrix.grand_total(), 3);
        assert_eq!(matrix.value("Alice", date(2)), Some(1));
        assert_eq!(output.reports_used.iter().collect::<Vec<_>>(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_two_abilities_feed_the_boss_summary() {
        let targets = vec![Target::new("Fractillus", 3135, Some(1230163)), Target::new("Fractillus", 3135, Some(1247424))];
        let source = FakeSource::default()
            .report("R", 3, 90)
            .rows("R", Some(1230163), Metric::Deaths, &[("P1", 2), ("P2", 1)])
            .rows("R", Some(1247424), Metric::Deaths, &[("P1", 1), ("P3", 4)]);

        let output = run(Arc::new(source), &config(targets), |_| {}).await.unwrap();
        let summary = output.tables(Metric::Deaths).unwrap().summary(3135).unwrap();

        assert_eq!(summary.matrix.row("P1").unwrap().total, 3);
        assert_eq!(summary.matrix.row("P2").unwrap().total, 1);
        assert_eq!(summary.matrix.row("P3").unwrap().total, 4);
        assert_eq!(summary.matrix.grand_total(), 8);
    }

    #[tokio::test]
    async fn test_failed_job_leaves_its_key_absent() {
        let source = FakeSource::default()
            .report("good", 2, 60)
            .report("bad", 4, 60)
            .rows("good", Some(1227472), Metric::Deaths, &[("Alice", 2)])
            .rows("bad", Some(1227472), Metric::Deaths, &[("Alice", 9)])
            .failing("bad");

        let output = run(Arc::new(source), &config(vec![salhadaar()]), |_| {}).await.unwrap();
        let deaths = output.tables(Metric::Deaths).unwrap();
        let matrix = &deaths.tables[&0];

        assert_eq!(deaths.resolved_entries, 1);
        assert_eq!(matrix.columns.iter().map(|c| c.date).collect::<Vec<_>>(), vec![date(2)]);
        assert_eq!(matrix.grand_total(), 2);
        assert!(!output.reports_used.contains("bad"));
    }

    #[tokio::test]
    async fn test_rows_failure_drops_the_job_even_with_fights() {
        let source = FakeSource::default()
            .report("good", 2, 60)
            .report("norows", 4, 60)
            .rows("good", Some(1227472), Metric::Deaths, &[("Alice", 2)])
            .rows_failing("norows");

        let output = run(Arc::new(source), &config(vec![salhadaar()]), |_| {}).await.unwrap();
        let deaths = output.tables(Metric::Deaths).unwrap();

        // no zero-filled column for the failed date
        assert_eq!(deaths.resolved_entries, 1);
        assert_eq!(deaths.tables[&0].columns.iter().map(|c| c.date).collect::<Vec<_>>(), vec![date(2)]);
        assert!(!output.reports_used.contains("norows"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_worker_pool_bounds_jobs_in_flight() {
        let mut source = FakeSource::default().slow(Duration::from_millis(20));
        for day in 1..=20 {
            let code = format!("R{:02}", day);
            source = source.report(&code, day, 60).rows(&code, Some(1227472), Metric::Deaths, &[("Alice", 1)]);
        }
        let source = Arc::new(source);
        let mut config = config(vec![salhadaar(), Target::all_abilities("Fractillus", 3135)]);
        config.workers = 3;

        let output = run(source.clone(), &config, |_| {}).await.unwrap();

        assert_eq!(output.stats.jobs, 40);
        assert_eq!(source.queries.lock().len(), 40);
        assert_eq!(source.peak_in_flight.load(Ordering::SeqCst), config.workers);
        assert_eq!(source.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hung_call_is_reclaimed_by_the_timeout() {
        let source = FakeSource::default()
            .report("quick", 2, 60)
            .report("stuck", 3, 60)
            .rows("quick", Some(1227472), Metric::Deaths, &[("Alice", 1)])
            .hanging("stuck");
        let mut config = config(vec![salhadaar()]);
        config.call_timeout = Duration::from_millis(50);

        let output = run(Arc::new(source), &config, |_| {}).await.unwrap();
        let matrix = &output.tables(Metric::Deaths).unwrap().tables[&0];
        assert_eq!(matrix.columns.len(), 1);
        assert_eq!(matrix.columns[0].date, date(2));
    }

    #[tokio::test]
    async fn test_empty_report_list_is_fatal() {
        let result = run(Arc::new(FakeSource::default()), &config(vec![salhadaar()]), |_| {}).await;
        assert!(matches!(result, Err(RunError::NoReports { guild_id: GUILD, .. })));
    }

    #[tokio::test]
    async fn test_missing_targets_are_fatal() {
        let source = FakeSource::default().report("A", 2, 60);
        let result = run(Arc::new(source), &config(Vec::new()), |_| {}).await;
        assert!(matches!(result, Err(RunError::NoTargets)));
    }

    #[tokio::test]
    async fn test_report_listing_failure_is_fatal() {
        let source = FakeSource {
            fail_listing: true,
            ..FakeSource::default()
        };
        let result = run(Arc::new(source), &config(vec![salhadaar()]), |_| {}).await;
        match result {
            Err(RunError::ReportListing { guild_id, source }) => {
                assert_eq!(guild_id, GUILD);
                assert!(matches!(source, LogSourceError::Connectivity(_)));
            }
            other => panic!("expected a listing error, got {:?}", other.map(|o| o.stats)),
        }
    }

    #[tokio::test]
    async fn test_progress_is_reported_per_job() {
        let source = FakeSource::default().report("A", 2, 60).report("B", 3, 60);
        let targets = vec![salhadaar(), Target::all_abilities("Fractillus", 3135)];

        let mut seen: Vec<JobProgress> = Vec::new();
        run(Arc::new(source), &config(targets), |p| seen.push(*p)).await.unwrap();

        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|p| p.total == 4));
        assert_eq!(seen.iter().map(|p| p.completed).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_run_settings_reach_every_query() {
        let source = Arc::new(
            FakeSource::default()
                .report("A", 2, 60)
                .rows("A", Some(1227472), Metric::Deaths, &[("Alice", 1)]),
        );
        let mut config = config(vec![salhadaar()]);
        config.cutoff = Some(3);
        config.wipes_only = true;
        config.difficulty = 4;

        let output = run(source.clone(), &config, |_| {}).await.unwrap();

        let queries = source.queries.lock();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].cutoff, Some(3));
        assert!(queries[0].wipes_only);
        assert_eq!(queries[0].difficulty, 4);
        assert_eq!(queries[0].boss_id, 3134);

        // the kill is not a pull when only wipes count
        let matrix = &output.tables(Metric::Deaths).unwrap().tables[&0];
        assert_eq!(matrix.columns[0].pulls, 2);
    }

    #[tokio::test]
    async fn test_both_metrics_are_resolved_independently() {
        let source = FakeSource::default()
            .report("A", 2, 60)
            .rows("A", Some(1227472), Metric::Deaths, &[("Alice", 1)])
            .rows("A", Some(1227472), Metric::DamageTaken, &[("Alice", 1_250_000), ("Bob", 400_000)]);
        let mut config = config(vec![salhadaar()]);
        config.metrics = MetricSelection::Both;

        let output = run(Arc::new(source), &config, |_| {}).await.unwrap();

        assert_eq!(output.stats.jobs, 2);
        assert_eq!(output.tables(Metric::Deaths).unwrap().tables[&0].grand_total(), 1);
        let damage = &output.tables(Metric::DamageTaken).unwrap().tables[&0];
        assert_eq!(damage.players(), vec!["Alice", "Bob"]);
        assert_eq!(damage.grand_total(), 1_650_000);
    }
}
