//! Output rendering for flattened policy rows.

use anyhow::{Context, Result};
use clap::ValueEnum;
use iam_engine::PolicyRow;

const HEADERS: [&str; 4] = ["ROLE", "PRINCIPAL", "PRINCIPAL ID", "TYPE"];

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns.
    Table,
    /// JSON array of rows.
    Json,
}

/// Render `rows` in `format`.
pub fn render(rows: &[PolicyRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(rows).context("failed to serialize policy rows")
        }
    }
}

fn render_table(rows: &[PolicyRow]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.role_id.clone(),
                row.principal_name.clone(),
                row.principal_id.clone(),
                row.principal_type.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format_line(&HEADERS.map(str::to_string), &widths);
    for line in &cells {
        out.push('\n');
        out.push_str(&format_line(line, &widths));
    }
    out
}

fn format_line(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}
