// Plain-text board rendering for `harada show`.
//
// The 9x9 grid is drawn from the layout engine's macro-squares projected
// back to board coordinates. Macro-square boundaries use `=`, ordinary
// cell boundaries `-`. Spanning cells have no interior lines and wrap
// their text over every row they cover.

use std::collections::BTreeMap;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use harada_core::{catalog, CellDefinition, BOARD_COLS, BOARD_ROWS};
use harada_engine::layout::{layout, MACRO_DIM};

const ROWS: usize = BOARD_ROWS as usize;
const COLS: usize = BOARD_COLS as usize;

/// Default column width in terminal cells.
pub const DEFAULT_WIDTH: usize = 12;
pub const MIN_WIDTH: usize = 4;

type Grid = [[Option<&'static CellDefinition>; COLS]; ROWS];

/// Which cell covers each board position.
fn cover_grid() -> Grid {
    let mut grid: Grid = [[None; COLS]; ROWS];
    for group in layout(catalog::cells()) {
        for placed in &group.cells {
            let (row, col) = placed.placement.global(group.key);
            for r in row..row + placed.placement.row_span {
                for c in col..col + placed.placement.col_span {
                    grid[(r - 1) as usize][(c - 1) as usize] = Some(placed.cell);
                }
            }
        }
    }
    grid
}

fn same(a: Option<&CellDefinition>, b: Option<&CellDefinition>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x.id == y.id)
}

/// Cut `text` into lines of at most `width` display columns.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut used = 0;
    for ch in text.chars().map(|c| if c.is_control() { ' ' } else { c }) {
        let w = ch.width().unwrap_or(0);
        if used + w > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            used = 0;
        }
        line.push(ch);
        used += w;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Pad or truncate to exactly `width` display columns.
fn fit(text: &str, width: usize, truncated: bool) -> String {
    let mut out = String::new();
    let mut used = 0;
    let limit = if truncated || text.width() > width {
        width.saturating_sub(1)
    } else {
        width
    };
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > limit {
            break;
        }
        out.push(ch);
        used += w;
    }
    if limit < width {
        out.push('…');
        used += 1;
    }
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

/// The text line a cell shows on board row `row` (0-based).
fn cell_line(cell: &CellDefinition, text: &str, row: usize, width: usize) -> String {
    let span = cell.row_span.max(1) as usize;
    let offset = row + 1 - cell.row as usize;
    let lines = wrap(text.trim(), width);
    let overflow = lines.len() > span;
    let line = lines.get(offset).map(String::as_str).unwrap_or("");
    fit(line, width, overflow && offset + 1 == span)
}

fn separator(grid: &Grid, row: usize, width: usize) -> String {
    let interior = |r: usize, c: usize| row > 0 && row < ROWS && same(grid[r - 1][c], grid[r][c]);
    let fill = if row % MACRO_DIM as usize == 0 { '=' } else { '-' };

    let mut line = String::new();
    for col in 0..COLS {
        let joint_hidden = col > 0
            && interior(row, col)
            && interior(row, col - 1)
            && same(grid[row][col - 1], grid[row][col]);
        line.push(if joint_hidden { ' ' } else { '+' });
        let ch = if interior(row, col) { ' ' } else { fill };
        line.extend(std::iter::repeat(ch).take(width));
    }
    line.push('+');
    line
}

/// Render the whole board. The selected cell is marked with `*`.
pub fn render_board(values: &BTreeMap<String, String>, selected: Option<&str>, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let grid = cover_grid();
    let mut out = String::new();

    for row in 0..ROWS {
        out.push_str(&separator(&grid, row, width));
        out.push('\n');

        let mut col = 0;
        while col < COLS {
            let cell = grid[row][col];
            let mut span = 1;
            while col + span < COLS && same(grid[row][col + span], cell) {
                span += 1;
            }
            let field = span * width + (span - 1);

            out.push('|');
            match cell {
                Some(cell) => {
                    let marked = selected == Some(cell.id.as_str()) && row + 1 == cell.row as usize;
                    out.push(if marked { '*' } else { ' ' });
                    let text = values.get(&cell.id).map(String::as_str).unwrap_or("");
                    out.push_str(&cell_line(cell, text, row, field - 1));
                }
                None => out.push_str(&" ".repeat(field)),
            }
            col += span;
        }
        out.push_str("|\n");
    }
    out.push_str(&separator(&grid, ROWS, width));
    out.push('\n');
    out
}
