//! # raidtally
//!
//! Per-player raid tallies from Warcraft Logs.
//!
//! Collects a guild's reports over a date range, keeps the best report of
//! each raid night, fetches deaths or damage taken for every tracked boss
//! ability in parallel and folds the results into player × date tables.
//!
//! ## Features
//!
//! - **Report Selection**: One report per UTC date, longest recording wins
//! - **Parallel Fetching**: Fixed worker pool with per-call timeouts
//! - **Conflict Resolution**: Highest total per (target, date) is kept
//! - **Tables**: Dense player × date matrices with totals and log links
//! - **Boss Summary**: All tracked abilities of a boss summed together
//! - **Data Export**: CSV, JSON and Excel
//!
//! ## Usage
//!
//! ```rust,no_run
//! use raidtally::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;
