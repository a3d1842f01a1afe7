//! Table recovery from column-aligned page text.
//!
//! Text extracted from statement PDFs keeps column alignment as runs of
//! spaces. A line splitting into two or more cells on such runs is a table
//! row; consecutive rows form one table.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::Table;

lazy_static! {
    /// Two or more spaces, or any tab, separate cells.
    static ref CELL_GAP: Regex = Regex::new(r"\t+|\s{2,}").unwrap();
}

/// Split column-aligned text into tables. Blank lines do not end a table;
/// a non-blank single-cell line does.
pub fn tables_from_text(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let cells = split_cells(line);
        if cells.len() >= 2 {
            current.push(cells);
        } else {
            flush(&mut current, &mut tables);
        }
    }
    flush(&mut current, &mut tables);

    trace!("Recovered {} tables from page text", tables.len());
    tables
}

fn split_cells(line: &str) -> Vec<String> {
    CELL_GAP
        .split(line.trim())
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn flush(rows: &mut Vec<Vec<String>>, tables: &mut Vec<Table>) {
    if rows.len() >= 2 {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let table = rows
            .drain(..)
            .map(|row| {
                let mut cells: Vec<Option<String>> = row
                    .into_iter()
                    .map(|c| if c.is_empty() { None } else { Some(c) })
                    .collect();
                cells.resize(width, None);
                cells
            })
            .collect();
        tables.push(table);
    } else {
        rows.clear();
    }
}
