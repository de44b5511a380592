//! Label and file-name formatting shared by the console view and exports.
//!
//! ## Formats
//!
//! - Date column: `"DD/MM (N pulls)"`, e.g. `"09/07 (12 pulls)"`
//! - Total column: `"Total (N pulls)"`
//! - Damage values: thousands separated, e.g. `"1 234 567"`
//! - Export stem: `warcraftlogs_<metric>_<boss-slug>_<ability-id|all|summary>`
//!
//! ```rust
//! use raidtally::libs::formatter::format_pull_label;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
//! assert_eq!(format_pull_label(date, 12), "09/07 (12 pulls)");
//! ```

use crate::libs::target::{Metric, Target};
use chrono::NaiveDate;

pub const ALL_ABILITIES: &str = "All abilities";
pub const BOSS_SUMMARY: &str = "Boss summary (all abilities)";

pub fn format_pull_label(date: NaiveDate, pulls: usize) -> String {
    format!("{} ({} pulls)", date.format("%d/%m"), pulls)
}

pub fn format_total_label(pulls: usize) -> String {
    format!("Total ({} pulls)", pulls)
}

/// Renders a cell for the console. Damage gets digit grouping, deaths stay
/// as plain integers.
pub fn format_value(metric: Metric, value: i64) -> String {
    match metric {
        Metric::Deaths => value.to_string(),
        Metric::DamageTaken => group_digits(value),
    }
}

fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// Second cell of the first header row: the ability the table is about.
pub fn ability_caption(ability_id: Option<u64>, ability_name: Option<&str>) -> String {
    match (ability_id, ability_name) {
        (None, _) => ALL_ABILITIES.to_string(),
        (Some(id), Some(name)) => format!("{} ({})", id, name),
        (Some(id), None) => id.to_string(),
    }
}

/// One-line description of a target, used in selectors and headings.
pub fn target_label(target: &Target, ability_name: Option<&str>) -> String {
    format!("{} — {}", target.boss_name, ability_caption(target.ability_id, ability_name))
}

/// Lowercase, ASCII-alphanumeric slug with single underscores.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("boss");
    }
    slug
}

/// What a table covers, for naming its export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableScope {
    Ability(u64),
    AllAbilities,
    Summary,
}

impl TableScope {
    pub fn of(target: &Target) -> Self {
        match target.ability_id {
            Some(id) => TableScope::Ability(id),
            None => TableScope::AllAbilities,
        }
    }
}

pub fn export_stem(metric: Metric, boss_name: &str, scope: TableScope) -> String {
    let suffix = match scope {
        TableScope::Ability(id) => id.to_string(),
        TableScope::AllAbilities => "all".to_string(),
        TableScope::Summary => "summary".to_string(),
    };
    format!("warcraftlogs_{}_{}_{}", metric.slug(), slugify(boss_name), suffix)
}
