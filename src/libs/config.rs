//! Persistent settings for raidtally.
//!
//! Settings live in `config.json` inside the application data directory
//! resolved by [`DataStorage`]:
//!
//! - **Windows**: `%LOCALAPPDATA%\raidtally\raidtally\config.json`
//! - **macOS**: `~/Library/Application Support/raidtally/raidtally/config.json`
//! - **Linux**: `~/.local/share/raidtally/raidtally/config.json`
//!
//! Both sections are optional. A missing section (or a missing file) falls
//! back to the defaults, so the tool works without running `raidtally init`
//! as long as the API credentials are in the environment. Credentials are
//! never written to this file; see [`crate::api::WclCredentials`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raidtally::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! let defaults = config.defaults();
//! println!("{} workers, {}s per call", defaults.workers, defaults.request_timeout);
//! config.save()?;
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::target::MYTHIC;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_API_URL: &str = "https://www.warcraftlogs.com/api/v2/client";
pub const DEFAULT_TOKEN_URL: &str = "https://www.warcraftlogs.com/oauth/token";
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Warcraft Logs endpoints. Overridable so the client can be pointed at a
/// mirror or a local mock.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WclConfig {
    pub api_url: String,
    pub token_url: String,
}

impl Default for WclConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

/// Values used by `raidtally run` when the matching flag is omitted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunDefaults {
    /// Guild page URL, e.g. `https://www.warcraftlogs.com/guild/id/123456`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_url: Option<String>,
    pub difficulty: u32,
    /// Size of the job worker pool.
    pub workers: usize,
    /// Per-call timeout in seconds.
    pub request_timeout: u64,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            guild_url: None,
            difficulty: MYTHIC,
            workers: DEFAULT_WORKERS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wcl: Option<WclConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<RunDefaults>,
}

impl Config {
    /// Loads `config.json`, returning the default configuration when the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    pub fn wcl(&self) -> WclConfig {
        self.wcl.clone().unwrap_or_default()
    }

    pub fn defaults(&self) -> RunDefaults {
        self.defaults.clone().unwrap_or_default()
    }

    /// Prompts for the run defaults, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();
        let current = config.defaults();

        msg_print!(Message::ConfigModuleDefaults);
        let guild_url: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptGuildUrl.to_string())
            .default(current.guild_url.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;

        config.defaults = Some(RunDefaults {
            guild_url: Some(guild_url.trim().to_string()).filter(|url| !url.is_empty()),
            difficulty: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptDifficulty.to_string())
                .default(current.difficulty)
                .interact_text()?,
            workers: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptWorkers.to_string())
                .default(current.workers)
                .interact_text()?,
            request_timeout: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptRequestTimeout.to_string())
                .default(current.request_timeout)
                .interact_text()?,
        });

        Ok(config)
    }
}
