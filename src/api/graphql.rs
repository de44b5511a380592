//! GraphQL documents and response shapes for the Warcraft Logs v2 API.
//!
//! Responses are decoded into these structs with serde; a missing required
//! field surfaces as [`LogSourceError::Schema`](super::LogSourceError::Schema)
//! instead of failing somewhere inside aggregation.

use serde::Deserialize;
use serde_json::Value;

pub const REPORTS_QUERY: &str = r#"
query ($guildID: Int!, $startTime: Float!, $endTime: Float!, $limit: Int!) {
  reportData {
    reports(guildID: $guildID, startTime: $startTime, endTime: $endTime, limit: $limit) {
      data {
        code
        title
        startTime
        endTime
      }
    }
  }
}
"#;

pub const FIGHTS_QUERY: &str = r#"
query ($code: String!) {
  reportData {
    report(code: $code) {
      fights {
        id
        difficulty
        kill
        startTime
        endTime
        encounterID
      }
    }
  }
}
"#;

pub const ACTORS_QUERY: &str = r#"
query ($code: String!) {
  reportData {
    report(code: $code) {
      masterData {
        actors {
          id
          name
          type
        }
      }
    }
  }
}
"#;

pub const EVENTS_QUERY: &str = r#"
query ($code: String!, $startTime: Float!, $endTime: Float!, $fightIDs: [Int], $dataType: EventDataType!, $abilityID: Float) {
  reportData {
    report(code: $code) {
      events(startTime: $startTime, endTime: $endTime, fightIDs: $fightIDs, dataType: $dataType, abilityID: $abilityID) {
        data
        nextPageTimestamp
      }
    }
  }
}
"#;

pub const ABILITY_QUERY: &str = r#"
query ($id: Int!) {
  gameData {
    ability(id: $id) {
      id
      name
    }
  }
}
"#;

/// Page size requested when listing a guild's reports.
pub const REPORTS_LIMIT: u32 = 100;

/// Top-level GraphQL envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

// === reports ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsData {
    pub report_data: ReportsNode,
}

#[derive(Debug, Deserialize)]
pub struct ReportsNode {
    pub reports: ReportPage,
}

#[derive(Debug, Deserialize)]
pub struct ReportPage {
    pub data: Vec<RawReport>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    pub code: String,
    #[serde(default)]
    pub title: Option<String>,
    pub start_time: f64,
    pub end_time: f64,
}

// === single report ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData<T> {
    pub report_data: ReportHolder<T>,
}

#[derive(Debug, Deserialize)]
pub struct ReportHolder<T> {
    pub report: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct FightsNode {
    pub fights: Vec<RawFight>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFight {
    pub id: u32,
    #[serde(default)]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub kill: Option<bool>,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(rename = "encounterID", default)]
    pub encounter_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterDataNode {
    pub master_data: MasterData,
}

#[derive(Debug, Deserialize)]
pub struct MasterData {
    pub actors: Vec<RawActor>,
}

#[derive(Debug, Deserialize)]
pub struct RawActor {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventsNode {
    pub events: EventPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    #[serde(default)]
    pub data: Vec<RawEvent>,
    #[serde(default)]
    pub next_page_timestamp: Option<f64>,
}

/// One combat event. Only the fields the tallies look at are kept; all of
/// them are optional because event shapes vary by type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub fight: Option<u32>,
    #[serde(rename = "targetID", default)]
    pub target_id: Option<i64>,
    #[serde(rename = "abilityGameID", default)]
    pub ability_game_id: Option<u64>,
    #[serde(rename = "killingAbilityGameID", default)]
    pub killing_ability_game_id: Option<u64>,
    #[serde(default)]
    pub amount: Option<Value>,
}

impl RawEvent {
    /// Damage amount, treating anything that is not an integer as zero.
    pub fn amount(&self) -> i64 {
        match &self.amount {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }
}

// === game data ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityData {
    pub game_data: AbilityHolder,
}

#[derive(Debug, Deserialize)]
pub struct AbilityHolder {
    pub ability: Option<RawAbility>,
}

#[derive(Debug, Deserialize)]
pub struct RawAbility {
    #[serde(default)]
    pub name: Option<String>,
}
