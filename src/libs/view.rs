use super::bosses::BossCatalog;
use super::formatter::format_value;
use super::matrix::Matrix;
use anyhow::Result;
use prettytable::{row, Cell, Row, Table};

/// Console rendering of result tables and the boss catalog.
pub struct View {}

impl View {
    /// Prints a result table. `search` keeps only players whose name
    /// contains it, ignoring case.
    pub fn matrix(matrix: &Matrix, search: Option<&str>) -> Result<()> {
        let mut table = Table::new();
        table.set_titles(Row::new(matrix.headers().iter().map(|h| Cell::new(h)).collect()));

        let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());
        for player in &matrix.rows {
            if let Some(needle) = &needle {
                if !player.player.to_lowercase().contains(needle) {
                    continue;
                }
            }

            let mut cells = Vec::with_capacity(player.values.len() + 2);
            cells.push(Cell::new(&player.player));
            cells.extend(player.values.iter().map(|v| Cell::new(&format_value(matrix.metric, *v))));
            cells.push(Cell::new(&format_value(matrix.metric, player.total)));
            table.add_row(Row::new(cells));
        }
        table.printstd();

        Ok(())
    }

    pub fn links(matrix: &Matrix) -> Result<()> {
        let mut table = Table::new();
        table.set_titles(row!["DATE", "LOG"]);
        for link in &matrix.links {
            table.add_row(row![link.label, link.url()]);
        }
        table.printstd();

        Ok(())
    }

    pub fn bosses(catalog: &BossCatalog) -> Result<()> {
        let mut table = Table::new();
        table.set_titles(row!["BOSS", "ID", "ABILITY ID", "ABILITY"]);
        for (name, entry) in &catalog.bosses {
            if entry.abilities.is_empty() {
                table.add_row(row![name, entry.id, "", ""]);
                continue;
            }
            for ability in &entry.abilities {
                table.add_row(row![name, entry.id, ability, catalog.ability_name(*ability).unwrap_or("")]);
            }
        }
        table.printstd();

        Ok(())
    }
}
