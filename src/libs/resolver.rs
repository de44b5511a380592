//! Folds job results into one winner per (target, date).
//!
//! When two reports land on the same key, the one whose total is strictly
//! greater replaces the incumbent wholesale. Exact ties keep whichever
//! result arrived first. Results without pulls never take part.

use crate::libs::jobs::JobResult;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Key of a resolved entry: target position and calendar date.
pub type ResolutionKey = (usize, NaiveDate);

#[derive(Debug, Clone, Default)]
pub struct ConflictResolver {
    resolved: HashMap<ResolutionKey, JobResult>,
    all_players: BTreeSet<String>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one result. Returns `true` when it became (or replaced) the
    /// entry for its key.
    pub fn accept(&mut self, result: JobResult) -> bool {
        if result.num_pulls == 0 {
            return false;
        }

        self.all_players.extend(result.player_counts.keys().cloned());

        let key = (result.target_index, result.date);
        match self.resolved.get(&key) {
            Some(incumbent) if result.total_metric <= incumbent.total_metric => false,
            _ => {
                self.resolved.insert(key, result);
                true
            }
        }
    }

    pub fn get(&self, target_index: usize, date: NaiveDate) -> Option<&JobResult> {
        self.resolved.get(&(target_index, date))
    }

    /// Winning entries of one target, by ascending date.
    pub fn entries_for(&self, target_index: usize) -> Vec<&JobResult> {
        let mut entries: Vec<&JobResult> = self.resolved.values().filter(|r| r.target_index == target_index).collect();
        entries.sort_by_key(|r| r.date);
        entries
    }

    pub fn resolved(&self) -> &HashMap<ResolutionKey, JobResult> {
        &self.resolved
    }

    /// Every player seen in any result with pulls, winning or not.
    pub fn all_players(&self) -> &BTreeSet<String> {
        &self.all_players
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Distinct report codes among the winning entries.
    pub fn reports_used(&self) -> BTreeSet<String> {
        self.resolved.values().map(|r| r.report_code.clone()).collect()
    }
}
