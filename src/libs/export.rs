//! Writes result tables to CSV, JSON or Excel files.
//!
//! Every format carries the same two-row header:
//!
//! ```text
//! Nexus-King Salhadaar,1227472 (Besiege)
//! Player,02/07 (14 pulls),09/07 (11 pulls),Total (25 pulls)
//! Alice,3,1,4
//! ```
//!
//! File names follow `warcraftlogs_<metric>_<boss-slug>_<ability-id|all|summary>`
//! with the extension of the chosen format, inside the output directory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raidtally::libs::export::{ExportFormat, ExportTable, Exporter};
//!
//! let exporter = Exporter::new(ExportFormat::Csv, None);
//! let path = exporter.export(&ExportTable::from_matrix(&matrix, caption), &stem)?;
//! ```

use crate::libs::matrix::Matrix;
use crate::libs::target::Metric;
use anyhow::Result;
use rust_xlsxwriter::{Color, Format, Workbook};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub player: String,
    pub values: Vec<i64>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportLink {
    pub label: String,
    pub url: String,
}

/// A result table flattened for writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub boss: String,
    /// Ability (or summary) caption shown next to the boss name.
    pub caption: String,
    pub metric: Metric,
    pub headers: Vec<String>,
    pub rows: Vec<ExportRow>,
    pub links: Vec<ExportLink>,
}

impl ExportTable {
    pub fn from_matrix(matrix: &Matrix, caption: impl Into<String>) -> Self {
        Self {
            boss: matrix.boss_name.clone(),
            caption: caption.into(),
            metric: matrix.metric,
            headers: matrix.headers(),
            rows: matrix
                .rows
                .iter()
                .map(|r| ExportRow {
                    player: r.player.clone(),
                    values: r.values.clone(),
                    total: r.total,
                })
                .collect(),
            links: matrix
                .links
                .iter()
                .map(|l| ExportLink {
                    label: l.label.clone(),
                    url: l.url(),
                })
                .collect(),
        }
    }
}

pub struct Exporter {
    format: ExportFormat,
    output_dir: PathBuf,
}

impl Exporter {
    /// Files go to `output_dir`, or the working directory when `None`.
    pub fn new(format: ExportFormat, output_dir: Option<PathBuf>) -> Self {
        Self {
            format,
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", stem, self.format.extension()))
    }

    /// Writes `table` to `<output_dir>/<stem>.<ext>` and returns the path.
    pub fn export(&self, table: &ExportTable, stem: &str) -> Result<PathBuf> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)?;
        }

        let path = self.path_for(stem);
        match self.format {
            ExportFormat::Csv => export_csv(table, &path)?,
            ExportFormat::Json => export_json(table, &path)?,
            ExportFormat::Excel => export_excel(table, &path)?,
        }
        tracing::debug!(path = %path.display(), rows = table.rows.len(), "table exported");
        Ok(path)
    }
}

fn export_csv(table: &ExportTable, path: &Path) -> Result<()> {
    // the heading row is shorter than the data rows
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    wtr.write_record([table.boss.as_str(), table.caption.as_str()])?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.player.clone());
        record.extend(row.values.iter().map(i64::to_string));
        record.push(row.total.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn export_json(table: &ExportTable, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(table)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_excel(table: &ExportTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_background_color(Color::Gray);
    let title_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(table.metric.label())?;
    worksheet.write_string_with_format(0, 0, &table.boss, &title_format)?;
    worksheet.write_string_with_format(0, 1, &table.caption, &title_format)?;
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(1, col as u16, header, &header_format)?;
    }

    let mut row = 2;
    for player in &table.rows {
        worksheet.write_string(row, 0, &player.player)?;
        for (col, value) in player.values.iter().enumerate() {
            worksheet.write_number(row, col as u16 + 1, *value as f64)?;
        }
        worksheet.write_number(row, player.values.len() as u16 + 1, player.total as f64)?;
        row += 1;
    }
    worksheet.autofit();

    if !table.links.is_empty() {
        let logs = workbook.add_worksheet();
        logs.set_name("Logs")?;
        logs.write_string_with_format(0, 0, "Date", &header_format)?;
        logs.write_string_with_format(0, 1, "Log", &header_format)?;
        for (i, link) in table.links.iter().enumerate() {
            logs.write_string(i as u32 + 1, 0, &link.label)?;
            logs.write_string(i as u32 + 1, 1, &link.url)?;
        }
        logs.autofit();
    }

    workbook.save(path)?;
    Ok(())
}
