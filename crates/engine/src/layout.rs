//! Layout engine.
//!
//! Turns the flat cell list into nine macro-squares, each a 3x3 grid of
//! local placements. Spanning cells use the same arithmetic as unit cells:
//! the anchor decides the macro-square, the span carries over unchanged.

use std::collections::BTreeMap;

use harada_core::CellDefinition;

/// Macro-squares per side.
pub const MACRO_DIM: u8 = 3;

/// Coordinates of a macro-square, both in 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacroKey {
    pub row: u8,
    pub col: u8,
}

impl MacroKey {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Macro-square containing a global (row, col) anchor.
    pub fn of(row: u8, col: u8) -> Self {
        Self {
            row: row.div_ceil(MACRO_DIM),
            col: col.div_ceil(MACRO_DIM),
        }
    }

    /// All nine keys, macro-row-major.
    pub fn all() -> impl Iterator<Item = MacroKey> {
        (1..=MACRO_DIM).flat_map(|r| (1..=MACRO_DIM).map(move |c| MacroKey::new(r, c)))
    }
}

impl std::fmt::Display for MacroKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Local placement rectangle inside a macro-square (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: u8,
    pub col: u8,
    pub row_span: u8,
    pub col_span: u8,
}

impl Placement {
    pub fn for_cell(cell: &CellDefinition) -> Self {
        Self {
            row: (cell.row - 1) % MACRO_DIM + 1,
            col: (cell.col - 1) % MACRO_DIM + 1,
            row_span: cell.row_span.max(1),
            col_span: cell.col_span.max(1),
        }
    }

    /// Project back to global board coordinates.
    pub fn global(&self, key: MacroKey) -> (u8, u8) {
        (
            (key.row - 1) * MACRO_DIM + self.row,
            (key.col - 1) * MACRO_DIM + self.col,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell<'a> {
    pub cell: &'a CellDefinition,
    pub placement: Placement,
}

/// One macro-square and its members, ordered by (row, col).
#[derive(Debug, Clone, PartialEq)]
pub struct MacroGroup<'a> {
    pub key: MacroKey,
    pub cells: Vec<PlacedCell<'a>>,
}

/// Group cells into all nine macro-squares.
///
/// Every key is present in the output even if nothing anchors there.
pub fn layout(cells: &[CellDefinition]) -> Vec<MacroGroup<'_>> {
    let mut grouped: BTreeMap<MacroKey, Vec<PlacedCell<'_>>> = BTreeMap::new();
    for cell in cells {
        grouped
            .entry(MacroKey::of(cell.row, cell.col))
            .or_default()
            .push(PlacedCell {
                cell,
                placement: Placement::for_cell(cell),
            });
    }

    MacroKey::all()
        .map(|key| {
            let mut members = grouped.remove(&key).unwrap_or_default();
            members.sort_by_key(|p| (p.cell.row, p.cell.col));
            MacroGroup { key, cells: members }
        })
        .collect()
}
