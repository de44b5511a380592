//! Warcraft Logs v2 GraphQL client.
//!
//! Implements [`LogSource`] on top of the public client API:
//!
//! - **Authentication**: OAuth2 client-credentials, token cached per client
//! - **Reports**: Guild report listing for a time window
//! - **Fights**: Encounter/difficulty filtered pulls of a report
//! - **Events**: Paginated `Deaths` / `DamageTaken` event streams reduced to
//!   per-player rows, with the optional "ignore after Nth death" cutoff
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raidtally::api::{WarcraftLogs, WclCredentials};
//! use raidtally::libs::config::Config;
//!
//! let config = Config::read()?;
//! let client = WarcraftLogs::new(&config, WclCredentials::from_env()?)?;
//! let name = client.lookup_ability_name(1227472).await?;
//! ```

use super::graphql::{
    AbilityData, Envelope, EventPage, EventsNode, FightsNode, MasterDataNode, RawEvent, ReportData, ReportsData, TokenResponse, ABILITY_QUERY, ACTORS_QUERY,
    EVENTS_QUERY, FIGHTS_QUERY, REPORTS_LIMIT, REPORTS_QUERY,
};
use super::{LogSource, LogSourceError};
use crate::libs::config::{Config, WclConfig};
use crate::libs::data_storage::DataStorage;
use crate::libs::report::{Fight, MetricRow, Report};
use crate::libs::target::{Metric, MetricQuery};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tokio::sync::OnceCell;

pub const CLIENT_ID_VAR: &str = "WCL_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "WCL_CLIENT_SECRET";
pub const ENV_FILE_NAME: &str = ".env";

/// Client-credentials pair issued at https://www.warcraftlogs.com/api/clients/.
#[derive(Clone)]
pub struct WclCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for WclCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WclCredentials").field("client_id", &self.client_id).field("client_secret", &"***").finish()
    }
}

impl WclCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads the credentials from the environment.
    ///
    /// A `.env` in the working directory is loaded first, then the one in the
    /// application data directory written by `raidtally init`. Variables that
    /// are already set are never overwritten.
    pub fn from_env() -> Result<Self, LogSourceError> {
        let _ = dotenv::dotenv();
        if let Ok(path) = DataStorage::new().get_path(ENV_FILE_NAME) {
            if path.exists() {
                let _ = dotenv::from_path(&path);
            }
        }

        let client_id = env::var(CLIENT_ID_VAR).unwrap_or_default();
        let client_secret = env::var(CLIENT_SECRET_VAR).unwrap_or_default();
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return Err(LogSourceError::Auth(format!("missing {} or {}", CLIENT_ID_VAR, CLIENT_SECRET_VAR)));
        }

        Ok(Self::new(client_id.trim(), client_secret.trim()))
    }
}

/// GraphQL client for the Warcraft Logs v2 API.
///
/// Cheap to share behind an `Arc`: the reqwest client pools connections and
/// the bearer token is fetched once and reused by every worker.
#[derive(Debug)]
pub struct WarcraftLogs {
    client: Client,
    config: WclConfig,
    credentials: WclCredentials,
    token: OnceCell<String>,
}

impl WarcraftLogs {
    /// Builds a client from the persisted configuration.
    pub fn new(config: &Config, credentials: WclCredentials) -> Result<Self, LogSourceError> {
        let defaults = config.defaults();
        Self::with_settings(config.wcl(), credentials, Duration::from_secs(defaults.request_timeout))
    }

    pub fn with_settings(config: WclConfig, credentials: WclCredentials, timeout: Duration) -> Result<Self, LogSourceError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| LogSourceError::Connectivity(e.to_string()))?;
        Ok(Self {
            client,
            config,
            credentials,
            token: OnceCell::new(),
        })
    }

    /// Requests (or returns the cached) bearer token.
    pub async fn token(&self) -> Result<&str, LogSourceError> {
        let token = self.token.get_or_try_init(|| self.request_token()).await?;
        Ok(token.as_str())
    }

    async fn request_token(&self) -> Result<String, LogSourceError> {
        tracing::debug!(url = %self.config.token_url, "requesting access token");
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || status == StatusCode::BAD_REQUEST {
            return Err(LogSourceError::Auth(format!("token endpoint answered {}", status)));
        }
        if !status.is_success() {
            return Err(LogSourceError::Connectivity(format!("token endpoint answered {}", status)));
        }

        let body: Value = response.json().await?;
        let token: TokenResponse = serde_json::from_value(body).map_err(|e| LogSourceError::schema("token response", e))?;
        Ok(token.access_token)
    }

    /// Runs one GraphQL document and decodes its `data` member into `T`.
    async fn query<T: DeserializeOwned>(&self, context: &str, query: &str, variables: Value) -> Result<T, LogSourceError> {
        let token = self.token().await?;
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LogSourceError::Auth(format!("{} request answered {}", context, status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LogSourceError::Connectivity(format!("{} request failed: {} - {}", context, status, body)));
        }

        let envelope: Envelope = response.json().await?;
        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(LogSourceError::Api(messages.join("; ")));
        }

        let data = envelope.data.ok_or_else(|| LogSourceError::schema(context, "missing data"))?;
        serde_json::from_value(data).map_err(|e| LogSourceError::schema(context, e))
    }

    /// Fetches every page of events of one data type for the given fights.
    async fn events(&self, code: &str, fights: &[Fight], data_type: &str, ability_id: Option<u64>) -> Result<Vec<RawEvent>, LogSourceError> {
        let fight_ids: Vec<u32> = fights.iter().map(|f| f.id).collect();
        let Some(start) = fights.iter().map(|f| f.start_time).min() else {
            return Ok(Vec::new());
        };
        let end = fights.iter().map(|f| f.end_time).max().unwrap_or(start);

        let mut events = Vec::new();
        let mut page_start = start as f64;
        loop {
            let variables = json!({
                "code": code,
                "startTime": page_start,
                "endTime": end as f64,
                "fightIDs": fight_ids,
                "dataType": data_type,
                // abilityID is a Float in the schema
                "abilityID": ability_id.map(|id| id as f64),
            });
            let node: ReportData<EventsNode> = self.query("events", EVENTS_QUERY, variables).await?;
            let page: EventPage = node
                .report_data
                .report
                .ok_or_else(|| LogSourceError::Api(format!("report {} not found", code)))?
                .events;

            events.extend(page.data);
            match page.next_page_timestamp {
                Some(next) if next > page_start => page_start = next,
                _ => break,
            }
        }

        tracing::debug!(report = code, data_type, count = events.len(), "fetched events");
        Ok(events)
    }

    /// Maps actor ids to names for every `Player` actor of a report.
    async fn player_names(&self, code: &str) -> Result<HashMap<i64, String>, LogSourceError> {
        let node: ReportData<MasterDataNode> = self.query("actors", ACTORS_QUERY, json!({ "code": code })).await?;
        let actors = node
            .report_data
            .report
            .ok_or_else(|| LogSourceError::Api(format!("report {} not found", code)))?
            .master_data
            .actors;

        Ok(actors
            .into_iter()
            .filter(|a| a.kind.as_deref() == Some("Player"))
            .filter_map(|a| a.name.filter(|n| !n.is_empty()).map(|name| (a.id, name)))
            .collect())
    }

    /// Looks up the in-game name of an ability id.
    pub async fn lookup_ability_name(&self, ability_id: u64) -> Result<Option<String>, LogSourceError> {
        let data: AbilityData = self.query("ability", ABILITY_QUERY, json!({ "id": ability_id })).await?;
        Ok(data.game_data.ability.and_then(|a| a.name).filter(|n| !n.is_empty()))
    }
}

/// Timestamp of the Nth player death of every fight that has at least N.
pub(crate) fn death_cutoffs(deaths: &[RawEvent], players: &HashMap<i64, String>, nth: u32) -> HashMap<u32, f64> {
    let mut per_fight: HashMap<u32, Vec<f64>> = HashMap::new();
    for event in deaths {
        let is_player = event.target_id.map(|id| players.contains_key(&id)).unwrap_or(false);
        if let (Some(fight), true) = (event.fight, is_player) {
            per_fight.entry(fight).or_default().push(event.timestamp);
        }
    }

    let nth = nth.max(1) as usize;
    per_fight
        .into_iter()
        .filter_map(|(fight, mut stamps)| {
            stamps.sort_by(|a, b| a.total_cmp(b));
            stamps.get(nth - 1).map(|ts| (fight, *ts))
        })
        .collect()
}

fn within_cutoff(event: &RawEvent, cutoffs: &HashMap<u32, f64>) -> bool {
    match event.fight.and_then(|f| cutoffs.get(&f)) {
        Some(limit) => event.timestamp <= *limit,
        None => true,
    }
}

/// Reduces death events to per-player death counts.
pub(crate) fn tally_deaths(deaths: &[RawEvent], players: &HashMap<i64, String>, ability_id: Option<u64>, cutoffs: &HashMap<u32, f64>) -> HashMap<String, i64> {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for event in deaths {
        if let Some(ability) = ability_id {
            let killing = event.killing_ability_game_id.or(event.ability_game_id);
            if killing != Some(ability) {
                continue;
            }
        }
        if !within_cutoff(event, cutoffs) {
            continue;
        }
        let Some(name) = event.target_id.and_then(|id| players.get(&id)) else {
            continue;
        };
        *counts.entry(name.clone()).or_insert(0) += 1;
    }
    counts
}

/// Reduces damage-taken events to per-player damage sums.
pub(crate) fn tally_damage(
    events: &[RawEvent],
    players: &HashMap<i64, String>,
    fight_ids: &[u32],
    ability_id: Option<u64>,
    cutoffs: &HashMap<u32, f64>,
) -> HashMap<String, i64> {
    let mut damage: HashMap<String, i64> = HashMap::new();
    for event in events {
        if !event.fight.map(|f| fight_ids.contains(&f)).unwrap_or(false) {
            continue;
        }
        if ability_id.is_some() && event.ability_game_id != ability_id {
            continue;
        }
        if !within_cutoff(event, cutoffs) {
            continue;
        }
        let Some(name) = event.target_id.and_then(|id| players.get(&id)) else {
            continue;
        };
        *damage.entry(name.clone()).or_insert(0) += event.amount();
    }
    damage
}

fn ms_to_utc(ms: f64) -> Result<DateTime<Utc>, LogSourceError> {
    Utc.timestamp_millis_opt(ms as i64).single().ok_or_else(|| LogSourceError::schema("report timestamps", format!("{} is out of range", ms)))
}

fn into_rows(map: HashMap<String, i64>) -> Vec<MetricRow> {
    let mut rows: Vec<MetricRow> = map.into_iter().map(|(player, value)| MetricRow { player, value }).collect();
    rows.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.player.to_lowercase().cmp(&b.player.to_lowercase())));
    rows
}

#[async_trait]
impl LogSource for WarcraftLogs {
    async fn list_reports(&self, guild_id: u64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Report>, LogSourceError> {
        let variables = json!({
            "guildID": guild_id,
            "startTime": start.timestamp_millis() as f64,
            "endTime": end.timestamp_millis() as f64,
            "limit": REPORTS_LIMIT,
        });
        let data: ReportsData = self.query("reports", REPORTS_QUERY, variables).await?;

        data.report_data
            .reports
            .data
            .into_iter()
            .map(|raw| {
                Ok(Report {
                    title: raw.title.unwrap_or_default(),
                    start_time: ms_to_utc(raw.start_time)?,
                    end_time: ms_to_utc(raw.end_time)?,
                    code: raw.code,
                })
            })
            .collect()
    }

    async fn list_fights(&self, report_code: &str, boss_id: u32, difficulty: u32) -> Result<Vec<Fight>, LogSourceError> {
        let node: ReportData<FightsNode> = self.query("fights", FIGHTS_QUERY, json!({ "code": report_code })).await?;
        let fights = node
            .report_data
            .report
            .ok_or_else(|| LogSourceError::Api(format!("report {} not found", report_code)))?
            .fights;

        let fights: Vec<Fight> = fights
            .into_iter()
            .filter(|f| f.encounter_id == boss_id && f.difficulty == Some(difficulty))
            .map(|f| Fight {
                id: f.id,
                kill: f.kill.unwrap_or(false),
                start_time: f.start_time as i64,
                end_time: f.end_time as i64,
            })
            .collect();

        tracing::debug!(report = report_code, boss_id, difficulty, count = fights.len(), "fights for boss");
        Ok(fights)
    }

    async fn metric_rows(&self, query: &MetricQuery) -> Result<Vec<MetricRow>, LogSourceError> {
        let mut fights = self.list_fights(&query.report_code, query.boss_id, query.difficulty).await?;
        if query.wipes_only {
            fights.retain(|f| !f.kill);
        }
        if fights.is_empty() {
            return Ok(Vec::new());
        }

        let players = self.player_names(&query.report_code).await?;
        let needs_deaths = query.metric == Metric::Deaths || query.cutoff.is_some();
        let deaths = if needs_deaths {
            self.events(&query.report_code, &fights, "Deaths", None).await?
        } else {
            Vec::new()
        };
        let cutoffs = match query.cutoff {
            Some(nth) => death_cutoffs(&deaths, &players, nth),
            None => HashMap::new(),
        };

        let tally = match query.metric {
            Metric::Deaths => tally_deaths(&deaths, &players, query.ability_id, &cutoffs),
            Metric::DamageTaken => {
                let events = self.events(&query.report_code, &fights, "DamageTaken", query.ability_id).await?;
                let fight_ids: Vec<u32> = fights.iter().map(|f| f.id).collect();
                tally_damage(&events, &players, &fight_ids, query.ability_id, &cutoffs)
            }
        };

        tracing::debug!(
            report = %query.report_code,
            boss_id = query.boss_id,
            ability_id = ?query.ability_id,
            metric = query.metric.slug(),
            players = tally.len(),
            "metric rows"
        );
        Ok(into_rows(tally))
    }
}
