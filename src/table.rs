//! Plain-text table rendering for previews and dry runs.

use std::fmt::Write as _;

use crate::grid::Grid;

/// Renders the header and up to `limit` rows (`0` renders all) as aligned
/// columns separated by two spaces. Truncated output ends with a row count note.
pub fn render_grid(grid: &Grid, limit: usize) -> String {
    let shown = if limit == 0 {
        grid.row_count()
    } else {
        limit.min(grid.row_count())
    };
    let rows = &grid.rows()[..shown];
    let header: Vec<String> = grid.header().iter().map(|h| clean(h)).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| clean(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut output, &rule, &widths);
    for row in &body {
        push_line(&mut output, row, &widths);
    }
    let hidden = grid.row_count() - shown;
    if hidden > 0 {
        let _ = writeln!(output, "... {hidden} more row(s)");
    }
    output
}

pub fn print_grid(grid: &Grid, limit: usize) {
    print!("{}", render_grid(grid, limit));
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    let _ = writeln!(output, "{}", line.trim_end());
}

fn clean(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}
