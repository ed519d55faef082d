//! Terminal output: value grids, the command listing and error reports.

use matcalc_core::{Grid, GridStyle, Value};
use matcalc_engine::{Catalog, Command, EvalError};
use std::fmt::Write as _;

pub fn value(value: &Value) -> String {
    grid(&value.to_grid())
}

/// Lays out a grid, one line per row, without a trailing newline.
pub fn grid(grid: &Grid) -> String {
    match grid.style {
        GridStyle::Plain => grid
            .cells
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n"),
        GridStyle::Bracketed => bracketed(grid),
    }
}

fn width(cell: &str) -> usize {
    cell.chars().count()
}

fn center(cell: &str, target: usize) -> String {
    let pad = target.saturating_sub(width(cell));
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), cell, " ".repeat(pad - left))
}

fn bracketed(grid: &Grid) -> String {
    let columns = grid.width();
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            grid.cells
                .iter()
                .filter_map(|row| row.get(c))
                .map(|cell| width(cell))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let height = grid.height();
    let mut lines = Vec::with_capacity(height);
    for (r, row) in grid.cells.iter().enumerate() {
        let body = widths
            .iter()
            .enumerate()
            .map(|(c, &w)| center(row.get(c).map_or("", String::as_str), w))
            .collect::<Vec<_>>()
            .join(" ");
        let (open, close) = match (height, r) {
            (1, _) => ("(", ")"),
            (_, 0) => ("⎛", "⎞"),
            (h, r) if r + 1 == h => ("⎝", "⎠"),
            _ => ("⎜", "⎟"),
        };
        lines.push(format!("{} {} {}", open, body, close));
    }
    lines.join("\n")
}

/// Every command, tier by tier.
pub fn catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for (index, tier) in catalog.tiers().enumerate() {
        let _ = writeln!(out, "Priority {}:", index + 1);
        for command in tier {
            let patterns: Vec<String> = command.patterns.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "  {:<22} {}", command.title, patterns.join("   "));
        }
    }
    out
}

pub fn command(command: &Command) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", command.title);
    for pattern in &command.patterns {
        let _ = writeln!(out, "  {}", pattern);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", command.description);
    out
}

/// Category, message and operands of `err`, with the offending part of `source` underlined
/// when the error knows where it happened.
pub fn error_report(source: &str, err: &EvalError) -> String {
    let mut out = format!("{}: {}", err.category(), err.details());
    if let Some(span) = err.span() {
        let start = usize::from(span.start()).min(source.len());
        let end = usize::from(span.end()).min(source.len());
        if source.is_char_boundary(start) && source.is_char_boundary(end) {
            let column = width(&source[..start]);
            let marks = width(&source[start..end]).max(1);
            let _ = write!(
                out,
                "\n  {}\n  {}{}",
                source,
                " ".repeat(column),
                "^".repeat(marks)
            );
        }
    }
    out
}
