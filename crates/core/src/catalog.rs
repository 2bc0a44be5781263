//! Cell catalog.
//!
//! The board is a 9x9 grid split into nine 3x3 macro-squares. The center
//! macro-square is a single merged goal cell; every other position is its
//! own cell. The catalog is built once and never mutated afterwards.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Logical board height in unit rows.
pub const BOARD_ROWS: u8 = 9;

/// Logical board width in unit columns.
pub const BOARD_COLS: u8 = 9;

/// Semantic role of a cell. Drives presentation and the assist prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellRole {
    /// An action item supporting a goal attribute
    #[default]
    Plain,
    /// Goal attribute heading
    Section,
    /// The overarching goal
    Goal,
    /// Goal attribute, highlighted
    Accent,
    /// Reference cell
    Ref,
}

impl CellRole {
    pub const ALL: [CellRole; 5] = [
        CellRole::Plain,
        CellRole::Section,
        CellRole::Goal,
        CellRole::Accent,
        CellRole::Ref,
    ];

    /// Wire name, as used in storage and service payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            CellRole::Plain => "plain",
            CellRole::Section => "section",
            CellRole::Goal => "goal",
            CellRole::Accent => "accent",
            CellRole::Ref => "ref",
        }
    }

    /// User-facing label for a cell of this role.
    pub fn label(&self) -> &'static str {
        match self {
            CellRole::Goal => "Goal",
            CellRole::Section | CellRole::Accent => "Goal attribute",
            CellRole::Plain | CellRole::Ref => "Requirement",
        }
    }

    /// Section and accent cells both hold a goal attribute.
    pub fn is_attribute(&self) -> bool {
        matches!(self, CellRole::Section | CellRole::Accent)
    }
}

impl std::fmt::Display for CellRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl std::fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown cell role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for CellRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRole::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Inclusive rectangle of unit positions covered by a cell (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub top: u8,
    pub left: u8,
    pub bottom: u8,
    pub right: u8,
}

impl Footprint {
    pub fn contains(&self, row: u8, col: u8) -> bool {
        row >= self.top && row <= self.bottom && col >= self.left && col <= self.right
    }

    pub fn overlaps(&self, other: &Footprint) -> bool {
        self.top <= other.bottom
            && other.top <= self.bottom
            && self.left <= other.right
            && other.left <= self.right
    }

    /// Every (row, col) position inside the rectangle, row-major.
    pub fn positions(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (self.top..=self.bottom).flat_map(move |r| (self.left..=self.right).map(move |c| (r, c)))
    }
}

/// Static definition of one addressable board cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDefinition {
    /// Stable identifier, used as the persistence key
    pub id: String,
    /// Anchor row (1-based)
    pub row: u8,
    /// Anchor column (1-based)
    pub col: u8,
    pub row_span: u8,
    pub col_span: u8,
    pub role: CellRole,
    pub initial_text: String,
}

impl CellDefinition {
    /// A plain 1x1 cell with no seeded text.
    pub fn new(id: impl Into<String>, row: u8, col: u8) -> Self {
        Self {
            id: id.into(),
            row,
            col,
            row_span: 1,
            col_span: 1,
            role: CellRole::Plain,
            initial_text: String::new(),
        }
    }

    pub fn with_role(mut self, role: CellRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_span(mut self, row_span: u8, col_span: u8) -> Self {
        self.row_span = row_span.max(1);
        self.col_span = col_span.max(1);
        self
    }

    pub fn with_initial_text(mut self, text: impl Into<String>) -> Self {
        self.initial_text = text.into();
        self
    }

    pub fn footprint(&self) -> Footprint {
        Footprint {
            top: self.row,
            left: self.col,
            bottom: self.row + self.row_span - 1,
            right: self.col + self.col_span - 1,
        }
    }

    pub fn covers(&self, row: u8, col: u8) -> bool {
        self.footprint().contains(row, col)
    }
}

// Roles of the 1x1 cells that are not plain.
const ROLE_SEEDS: &[(u8, u8, CellRole)] = &[
    (2, 2, CellRole::Section),
    (2, 5, CellRole::Section),
    (2, 8, CellRole::Section),
    (3, 5, CellRole::Ref),
    (5, 2, CellRole::Accent),
    (5, 8, CellRole::Accent),
    (8, 2, CellRole::Accent),
    (8, 5, CellRole::Accent),
    (8, 8, CellRole::Accent),
];

struct MergedSeed {
    id: &'static str,
    row: u8,
    col: u8,
    row_span: u8,
    col_span: u8,
    role: CellRole,
}

const MERGED_SEEDS: &[MergedSeed] = &[MergedSeed {
    id: "goal",
    row: 4,
    col: 4,
    row_span: 3,
    col_span: 3,
    role: CellRole::Goal,
}];

static CATALOG: Lazy<Vec<CellDefinition>> = Lazy::new(build_catalog);

static INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let cells: &'static [CellDefinition] = &CATALOG;
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| (cell.id.as_str(), i))
        .collect()
});

fn build_catalog() -> Vec<CellDefinition> {
    let merged: Vec<CellDefinition> = MERGED_SEEDS
        .iter()
        .map(|seed| {
            CellDefinition::new(seed.id, seed.row, seed.col)
                .with_span(seed.row_span, seed.col_span)
                .with_role(seed.role)
        })
        .collect();

    let mut cells = Vec::new();
    for row in 1..=BOARD_ROWS {
        for col in 1..=BOARD_COLS {
            if let Some(cell) = merged.iter().find(|c| c.row == row && c.col == col) {
                cells.push(cell.clone());
                continue;
            }
            if merged.iter().any(|c| c.covers(row, col)) {
                continue;
            }
            let role = ROLE_SEEDS
                .iter()
                .find(|(r, c, _)| *r == row && *c == col)
                .map(|(_, _, role)| *role)
                .unwrap_or_default();
            cells.push(CellDefinition::new(format!("r{}c{}", row, col), row, col).with_role(role));
        }
    }
    cells
}

/// All cell definitions, row-major by anchor.
pub fn cells() -> &'static [CellDefinition] {
    &CATALOG
}

/// Look up a cell definition by id.
pub fn cell(id: &str) -> Option<&'static CellDefinition> {
    INDEX.get(id).map(|&i| &CATALOG[i])
}

pub fn contains(id: &str) -> bool {
    INDEX.contains_key(id)
}

/// Role of a cell. This is the only place roles are resolved from.
pub fn role_of(id: &str) -> Option<CellRole> {
    cell(id).map(|c| c.role)
}

/// Default values: every cell id mapped to its seeded text.
pub fn defaults() -> BTreeMap<String, String> {
    CATALOG
        .iter()
        .map(|c| (c.id.clone(), c.initial_text.clone()))
        .collect()
}
