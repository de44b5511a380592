//! What a run tracks: boss/ability targets and the metric being tallied.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raid difficulty id used by Warcraft Logs for Mythic.
pub const MYTHIC: u32 = 5;

/// A (boss, ability-or-all) pair a run is configured to track.
///
/// `ability_id == None` means every ability of the boss counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub boss_name: String,
    pub boss_id: u32,
    pub ability_id: Option<u64>,
}

impl Target {
    pub fn new(boss_name: impl Into<String>, boss_id: u32, ability_id: Option<u64>) -> Self {
        Self {
            boss_name: boss_name.into(),
            boss_id,
            ability_id,
        }
    }

    pub fn all_abilities(boss_name: impl Into<String>, boss_id: u32) -> Self {
        Self::new(boss_name, boss_id, None)
    }
}

/// The per-player quantity being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Deaths,
    DamageTaken,
}

impl Metric {
    /// Short name used in file names and log fields.
    pub fn slug(&self) -> &'static str {
        match self {
            Metric::Deaths => "deaths",
            Metric::DamageTaken => "damage_taken",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Deaths => "Deaths",
            Metric::DamageTaken => "Damage taken",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which metrics a run computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MetricSelection {
    #[default]
    Deaths,
    DamageTaken,
    Both,
}

impl MetricSelection {
    pub fn metrics(&self) -> Vec<Metric> {
        match self {
            MetricSelection::Deaths => vec![Metric::Deaths],
            MetricSelection::DamageTaken => vec![Metric::DamageTaken],
            MetricSelection::Both => vec![Metric::Deaths, Metric::DamageTaken],
        }
    }
}

/// Everything a log source needs to produce per-player rows for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub report_code: String,
    pub boss_id: u32,
    pub ability_id: Option<u64>,
    pub difficulty: u32,
    /// Ignore events after the Nth player death of each pull.
    pub cutoff: Option<u32>,
    pub metric: Metric,
    /// Only count pulls that ended in a wipe.
    pub wipes_only: bool,
}
