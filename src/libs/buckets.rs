//! One report per calendar day.
//!
//! Guilds often upload several logs for the same evening (a second logger, a
//! restarted client). Only the longest recording of each UTC date is kept,
//! on the assumption that it covers the whole raid.

use crate::libs::report::Report;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Picks the best report of every UTC date.
///
/// The best report is the one with the longest `end_time - start_time`. On
/// equal durations the lexicographically smallest code wins, so the outcome
/// does not depend on the order the API listed the reports in.
///
/// The result is sorted by ascending date and holds exactly one entry per
/// distinct date present in `reports`.
pub fn select_best_per_date(reports: &[Report]) -> Vec<(NaiveDate, Report)> {
    let mut best: BTreeMap<NaiveDate, &Report> = BTreeMap::new();

    for report in reports {
        best.entry(report.date())
            .and_modify(|current| {
                if is_better(report, current) {
                    *current = report;
                }
            })
            .or_insert(report);
    }

    best.into_iter().map(|(date, report)| (date, report.clone())).collect()
}

fn is_better(candidate: &Report, current: &Report) -> bool {
    match candidate.duration().cmp(&current.duration()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.code < current.code,
    }
}
