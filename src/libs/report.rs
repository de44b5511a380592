//! Typed records returned by a log source.
//!
//! Every row the Warcraft Logs API hands back is mapped onto one of these
//! structures at the `api` boundary, so aggregation code never deals with
//! loosely-typed JSON.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Base URL used when linking a report in the browser.
pub const REPORT_URL: &str = "https://www.warcraftlogs.com/reports";

/// One recorded raid session.
///
/// Identity is the opaque `code`; two reports with the same code are the
/// same report regardless of title or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub code: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Report {
    /// Calendar date (UTC) the report belongs to, derived from its start.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    /// Length of the recording. Negative spans are clamped to zero.
    pub fn duration(&self) -> TimeDelta {
        let span = self.end_time - self.start_time;
        if span < TimeDelta::zero() {
            TimeDelta::zero()
        } else {
            span
        }
    }

    pub fn url(&self) -> String {
        report_url(&self.code)
    }
}

pub fn report_url(code: &str) -> String {
    format!("{}/{}", REPORT_URL, code)
}

/// One pull of a boss inside a report.
///
/// `start_time` and `end_time` are milliseconds relative to the start of the
/// report, which is what the API uses to bound event queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fight {
    pub id: u32,
    pub kill: bool,
    pub start_time: i64,
    pub end_time: i64,
}

/// A single per-player figure for one report: a death count or an amount of
/// damage taken depending on the metric that was queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub player: String,
    pub value: i64,
}

impl MetricRow {
    pub fn new(player: impl Into<String>, value: i64) -> Self {
        Self {
            player: player.into(),
            value,
        }
    }
}
