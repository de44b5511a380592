//! Core library modules of raidtally.
//!
//! ## Features
//!
//! - **Core Infrastructure**: Configuration, data storage, messaging
//! - **Aggregation**: Report buckets, job pool, conflict resolution, matrices, boss summaries
//! - **Data Model**: Reports, fights, targets, metrics
//! - **User Interface**: Console tables, data export, formatting

pub mod bosses;
pub mod buckets;
pub mod config;
pub mod data_storage;
pub mod export;
pub mod formatter;
pub mod guild;
pub mod jobs;
pub mod matrix;
pub mod messages;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod summary;
pub mod target;
pub mod view;
