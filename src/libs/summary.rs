//! Cross-ability aggregation for one boss.
//!
//! Sums every tracked ability of a boss into a single player × date table.
//! Contributing targets are those with the requested boss id that produced
//! a matrix; their date columns are unioned and each player's cells are
//! added up.

use crate::libs::matrix::{sort_rows, DateColumn, LogLink, Matrix, PlayerRow};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BossSummary {
    /// Target indices that were summed, ascending.
    pub contributing: Vec<usize>,
    pub matrix: Matrix,
}

/// Aggregates every table of `boss_id`.
///
/// Returns `None` when no target of the boss has a matrix.
pub fn summarize_boss(tables: &BTreeMap<usize, Matrix>, boss_id: u32) -> Option<BossSummary> {
    let contributing: Vec<(usize, &Matrix)> = tables.iter().filter(|(_, m)| m.boss_id == boss_id).map(|(i, m)| (*i, m)).collect();
    let (_, first) = contributing.first()?;

    // pulls of a date come from the first contributing table that has it
    let mut pulls: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (_, matrix) in &contributing {
        for column in &matrix.columns {
            pulls.entry(column.date).or_insert(column.pulls);
        }
    }
    let columns: Vec<DateColumn> = pulls.into_iter().map(|(date, pulls)| DateColumn { date, pulls }).collect();
    let position: HashMap<NaiveDate, usize> = columns.iter().enumerate().map(|(i, c)| (c.date, i)).collect();

    let mut sums: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for (_, matrix) in &contributing {
        for row in &matrix.rows {
            let cells = sums.entry(row.player.as_str()).or_insert_with(|| vec![0; columns.len()]);
            for (column, value) in matrix.columns.iter().zip(&row.values) {
                if let Some(&at) = position.get(&column.date) {
                    cells[at] += value;
                }
            }
        }
    }

    let mut rows: Vec<PlayerRow> = sums.into_iter().map(|(player, values)| PlayerRow::new(player, values)).collect();
    sort_rows(&mut rows);

    let mut links: Vec<LogLink> = Vec::new();
    for (_, matrix) in &contributing {
        for link in &matrix.links {
            if !links.iter().any(|l| l.report_code == link.report_code && l.label == link.label) {
                links.push(link.clone());
            }
        }
    }

    Some(BossSummary {
        contributing: contributing.iter().map(|(i, _)| *i).collect(),
        matrix: Matrix {
            boss_name: first.boss_name.clone(),
            boss_id,
            ability_id: None,
            metric: first.metric,
            columns,
            rows,
            links,
        },
    })
}

/// Distinct boss ids among the tables, in first-appearance order.
pub fn bosses_with_tables(tables: &BTreeMap<usize, Matrix>) -> Vec<(u32, String)> {
    let mut bosses: Vec<(u32, String)> = Vec::new();
    for matrix in tables.values() {
        if !bosses.iter().any(|(id, _)| *id == matrix.boss_id) {
            bosses.push((matrix.boss_id, matrix.boss_name.clone()));
        }
    }
    bosses
}
