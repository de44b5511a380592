//! Player × date tables built from resolved entries.
//!
//! A [`Matrix`] is dense: every player of the target has a value for every
//! date column, zero when the player did not appear in that day's report.
//! Row totals are always the sum of the row.

use crate::libs::formatter::{format_pull_label, format_total_label};
use crate::libs::jobs::JobResult;
use crate::libs::report::report_url;
use crate::libs::resolver::ConflictResolver;
use crate::libs::target::{Metric, Target};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateColumn {
    pub date: NaiveDate,
    pub pulls: usize,
}

impl DateColumn {
    pub fn label(&self) -> String {
        format_pull_label(self.date, self.pulls)
    }
}

/// Browser link to the report a column was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LogLink {
    pub label: String,
    pub report_code: String,
}

impl LogLink {
    pub fn url(&self) -> String {
        report_url(&self.report_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub player: String,
    pub values: Vec<i64>,
    pub total: i64,
}

impl PlayerRow {
    pub fn new(player: impl Into<String>, values: Vec<i64>) -> Self {
        let total = values.iter().sum();
        Self {
            player: player.into(),
            values,
            total,
        }
    }
}

/// Result table of one target (or one boss summary) for one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix {
    pub boss_name: String,
    pub boss_id: u32,
    pub ability_id: Option<u64>,
    pub metric: Metric,
    pub columns: Vec<DateColumn>,
    pub rows: Vec<PlayerRow>,
    pub links: Vec<LogLink>,
}

impl Matrix {
    pub fn total_pulls(&self) -> usize {
        self.columns.iter().map(|c| c.pulls).sum()
    }

    pub fn date_labels(&self) -> Vec<String> {
        self.columns.iter().map(DateColumn::label).collect()
    }

    pub fn total_label(&self) -> String {
        format_total_label(self.total_pulls())
    }

    /// Display header: `Player`, one label per date, the total label.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.columns.len() + 2);
        headers.push("Player".to_string());
        headers.extend(self.date_labels());
        headers.push(self.total_label());
        headers
    }

    /// Machine header: `Player`, ISO dates, `Total`.
    pub fn raw_headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.columns.len() + 2);
        headers.push("Player".to_string());
        headers.extend(self.columns.iter().map(|c| c.date.format("%Y-%m-%d").to_string()));
        headers.push("Total".to_string());
        headers
    }

    pub fn row(&self, player: &str) -> Option<&PlayerRow> {
        self.rows.iter().find(|r| r.player == player)
    }

    pub fn value(&self, player: &str, date: NaiveDate) -> Option<i64> {
        let column = self.columns.iter().position(|c| c.date == date)?;
        self.row(player).map(|r| r.values[column])
    }

    pub fn players(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.player.as_str()).collect()
    }

    /// Sum of every cell, equal to the sum of the row totals.
    pub fn grand_total(&self) -> i64 {
        self.rows.iter().map(|r| r.total).sum()
    }
}

/// Orders rows by descending total, then case-insensitive name, then exact
/// name.
pub fn sort_rows(rows: &mut [PlayerRow]) {
    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.player.to_lowercase().cmp(&b.player.to_lowercase()))
            .then_with(|| a.player.cmp(&b.player))
    });
}

/// Builds the matrix of one target from its resolved entries.
///
/// Returns `None` when the target has no resolved dates.
pub fn build_matrix(target: &Target, metric: Metric, entries: &[&JobResult]) -> Option<Matrix> {
    if entries.is_empty() {
        return None;
    }

    let mut entries = entries.to_vec();
    entries.sort_by_key(|e| e.date);

    let players: BTreeSet<&String> = entries.iter().flat_map(|e| e.player_counts.keys()).collect();
    let mut rows: Vec<PlayerRow> = players
        .into_iter()
        .map(|player| {
            let values = entries.iter().map(|e| e.player_counts.get(player).copied().unwrap_or(0)).collect();
            PlayerRow::new(player.clone(), values)
        })
        .collect();
    sort_rows(&mut rows);

    let columns: Vec<DateColumn> = entries.iter().map(|e| DateColumn { date: e.date, pulls: e.num_pulls }).collect();
    let links = entries
        .iter()
        .zip(&columns)
        .map(|(e, c)| LogLink {
            label: c.label(),
            report_code: e.report_code.clone(),
        })
        .collect();

    Some(Matrix {
        boss_name: target.boss_name.clone(),
        boss_id: target.boss_id,
        ability_id: target.ability_id,
        metric,
        columns,
        rows,
        links,
    })
}

/// Builds every target's matrix for one metric, keyed by target index.
/// Targets without resolved dates are absent from the map.
pub fn build_tables(resolver: &ConflictResolver, targets: &[Target], metric: Metric) -> BTreeMap<usize, Matrix> {
    targets
        .iter()
        .enumerate()
        .filter_map(|(index, target)| build_matrix(target, metric, &resolver.entries_for(index)).map(|m| (index, m)))
        .collect()
}

