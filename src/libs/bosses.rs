//! Catalog of known bosses and tracked abilities.
//!
//! Stored as `bosses.json` in the application data directory:
//!
//! ```json
//! {
//!   "bosses": { "Fractillus": { "id": 3135, "abilities": [1230163, 1247424] } },
//!   "ability_names": { "1230163": "Fracture" }
//! }
//! ```
//!
//! Without a file the built-in catalog of the current raid tier is used.
//! The first `raidtally bosses add` writes the built-in entries out together
//! with the new ability.

use super::data_storage::DataStorage;
use crate::libs::target::Target;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};

pub const BOSSES_FILE_NAME: &str = "bosses.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BossEntry {
    pub id: u32,
    #[serde(default)]
    pub abilities: Vec<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BossCatalog {
    #[serde(default)]
    pub bosses: BTreeMap<String, BossEntry>,
    #[serde(default)]
    pub ability_names: BTreeMap<u64, String>,
}

impl BossCatalog {
    /// Manaforge Omega, Mythic.
    pub fn builtin() -> Self {
        let bosses = [
            ("Plexus Sentinel", 3122, vec![1219346, 1219223]),
            ("Loom'ithar", 3123, vec![1226877, 1226366, 1237307]),
            ("Soulbinder Naazindhri", 3129, vec![]),
            ("Forgeweaver Araz", 3132, vec![1228168, 1237322]),
            ("The Soul Hunters", 3133, vec![1247495, 1227846]),
            ("Fractillus", 3135, vec![1230163, 1247424]),
            ("Nexus-King Salhadaar", 3134, vec![1227472, 1224794, 1225331, 1224840]),
            ("Dimensius, the All-Devouring", 3141, vec![]),
        ];
        let names = [
            (1219346, "Obliteration Arcanocannon / Tank mechanic"),
            (1219223, "Atomize / Wall mechanic"),
            (1226877, "Primal Spellstorm"),
            (1226366, "Living Silk"),
            (1237307, "Lair Weaving"),
            (1228168, "Silencing Tempest"),
            (1237322, "Prime Sequence"),
            (1247495, "Null Explosion"),
            (1227846, "Soul Hunt / Soaking"),
            (1230163, "Fracture"),
            (1247424, "Null Consumption"),
            (1227472, "Besiege"),
            (1224794, "Conquer"),
            (1225331, "Galactic Smash"),
            (1224840, "Behead"),
        ];

        Self {
            bosses: bosses
                .into_iter()
                .map(|(name, id, abilities)| (name.to_string(), BossEntry { id, abilities }))
                .collect(),
            ability_names: names.into_iter().map(|(id, name)| (id, name.to_string())).collect(),
        }
    }

    pub fn read() -> Result<Self> {
        let path = DataStorage::new().get_path(BOSSES_FILE_NAME)?;
        if !path.exists() {
            return Ok(Self::builtin());
        }

        let content = fs::read_to_string(path)?;
        let catalog: BossCatalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    pub fn save(&self) -> Result<()> {
        let path = DataStorage::new().get_path(BOSSES_FILE_NAME)?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(&file, &self)?;
        Ok(())
    }

    /// Registers an ability under a boss, creating the boss if needed.
    ///
    /// The boss id is overwritten with `boss_id`; an ability already listed
    /// only has its label updated.
    pub fn add_ability(&mut self, boss_name: &str, boss_id: u32, ability_id: u64, label: &str) {
        let entry = self.bosses.entry(boss_name.to_string()).or_insert_with(|| BossEntry { id: boss_id, abilities: Vec::new() });
        entry.id = boss_id;
        if !entry.abilities.contains(&ability_id) {
            entry.abilities.push(ability_id);
        }
        self.ability_names.insert(ability_id, label.to_string());
    }

    pub fn ability_name(&self, ability_id: u64) -> Option<&str> {
        self.ability_names.get(&ability_id).map(String::as_str)
    }

    /// Finds a boss by case-insensitive name or by encounter id.
    pub fn find(&self, name_or_id: &str) -> Option<(&str, &BossEntry)> {
        let needle = name_or_id.trim();
        if let Ok(id) = needle.parse::<u32>() {
            if let Some((name, entry)) = self.bosses.iter().find(|(_, e)| e.id == id) {
                return Some((name.as_str(), entry));
            }
        }
        self.bosses
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(needle))
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Parses every `--target` argument, keeping the first occurrence of
    /// each target so no two tables share an export file.
    pub fn parse_target_list(&self, inputs: &[String]) -> Result<Vec<Target>> {
        let mut targets: Vec<Target> = Vec::new();
        for input in inputs {
            for target in self.parse_targets(input)? {
                if targets.contains(&target) {
                    tracing::debug!(boss = %target.boss_name, ability_id = ?target.ability_id, "duplicate target ignored");
                    continue;
                }
                targets.push(target);
            }
        }
        Ok(targets)
    }

    /// Turns a `--target` argument into targets.
    ///
    /// - `BOSS`: all abilities of the boss
    /// - `BOSS:ID[,ID...]`: one target per ability id; `all` may be listed
    ///   as one of the ids
    /// - `BOSS:tracked`: one target per ability tracked in the catalog
    pub fn parse_targets(&self, input: &str) -> Result<Vec<Target>> {
        let (boss, abilities) = match input.rsplit_once(':') {
            Some((boss, abilities)) => (boss, Some(abilities)),
            None => (input, None),
        };
        let Some((boss_name, entry)) = self.find(boss) else {
            bail!("unknown boss '{}', see `raidtally bosses list`", boss.trim());
        };

        let Some(abilities) = abilities else {
            return Ok(vec![Target::all_abilities(boss_name, entry.id)]);
        };

        let mut targets = Vec::new();
        for part in abilities.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "all" => targets.push(Target::all_abilities(boss_name, entry.id)),
                "tracked" => targets.extend(entry.abilities.iter().map(|id| Target::new(boss_name, entry.id, Some(*id)))),
                _ => match part.parse::<u64>() {
                    Ok(id) => targets.push(Target::new(boss_name, entry.id, Some(id))),
                    Err(_) => bail!("invalid ability id '{}' in target '{}'", part, input),
                },
            }
        }
        if targets.is_empty() {
            bail!("target '{}' lists no abilities", input);
        }
        Ok(targets)
    }
}
