//! Log source abstraction and its Warcraft Logs implementation.
//!
//! The aggregation pipeline only talks to the outside world through the
//! [`LogSource`] trait. The production implementation is the GraphQL client
//! in [`wcl`]; tests substitute in-memory sources.
//!
//! ## Features
//!
//! - **Reports**: List a guild's reports inside a UTC window
//! - **Fights**: List the pulls of one boss at one difficulty inside a report
//! - **Metric Rows**: Per-player death counts or damage-taken amounts
//! - **Typed Boundary**: Raw JSON is mapped onto [`Report`], [`Fight`] and
//!   [`MetricRow`] here, failing with [`LogSourceError::Schema`] when fields
//!   are missing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raidtally::api::{LogSource, WarcraftLogs, WclCredentials};
//! use raidtally::libs::config::Config;
//!
//! let client = WarcraftLogs::new(&Config::read()?, WclCredentials::from_env()?)?;
//! let fights = client.list_fights("aBcD1234", 3134, 5).await?;
//! ```

use crate::libs::report::{Fight, MetricRow, Report};
use crate::libs::target::MetricQuery;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod graphql;
pub mod wcl;

pub use wcl::{WarcraftLogs, WclCredentials};

/// Failure modes of a log source call.
///
/// Inside a job every variant degrades that job to an empty result; only the
/// initial report listing treats them as fatal.
#[derive(Debug, Error)]
pub enum LogSourceError {
    /// The upstream call could not be completed (network, non-200 status).
    #[error("connection to the log source failed: {0}")]
    Connectivity(String),

    /// Credentials were rejected or are missing.
    #[error("log source rejected the credentials: {0}")]
    Auth(String),

    /// The API answered, but reported errors for the query.
    #[error("log source returned errors: {0}")]
    Api(String),

    /// The response did not have the expected shape.
    #[error("unexpected response shape for {context}: {detail}")]
    Schema { context: String, detail: String },

    /// The call did not finish within the configured timeout.
    #[error("log source call timed out after {0} seconds")]
    Timeout(u64),
}

impl LogSourceError {
    pub fn schema(context: impl Into<String>, detail: impl ToString) -> Self {
        LogSourceError::Schema {
            context: context.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<reqwest::Error> for LogSourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LogSourceError::Connectivity(format!("request timed out: {}", err))
        } else if err.is_decode() {
            LogSourceError::schema("response body", err)
        } else {
            LogSourceError::Connectivity(err.to_string())
        }
    }
}

/// The only boundary the aggregation core depends on.
///
/// Implementations must be shareable across the worker pool, hence the
/// `Send + Sync` bound and the boxed futures produced by `async_trait`.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Lists the reports of a guild whose recording overlaps `[start, end]`.
    ///
    /// An empty list is a valid answer.
    async fn list_reports(&self, guild_id: u64, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Report>, LogSourceError>;

    /// Lists the pulls of `boss_id` at `difficulty` inside one report.
    ///
    /// Only fights matching both the encounter id and the difficulty are
    /// returned.
    async fn list_fights(&self, report_code: &str, boss_id: u32, difficulty: u32) -> Result<Vec<Fight>, LogSourceError>;

    /// Produces one row per player for the query's report, boss, ability
    /// and metric.
    async fn metric_rows(&self, query: &MetricQuery) -> Result<Vec<MetricRow>, LogSourceError>;
}
