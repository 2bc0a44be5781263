//! Export snapshot: the full catalog plus current values.

use std::collections::BTreeMap;

use harada_core::{catalog, CellDefinition};

use crate::board::Board;
use crate::store::BoardStore;

/// Everything a document renderer needs to draw the board.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSnapshot {
    pub cells: Vec<CellDefinition>,
    pub values: BTreeMap<String, String>,
}

impl ExportSnapshot {
    /// Number of cells with non-blank text.
    pub fn filled_count(&self) -> usize {
        self.values.values().filter(|v| !v.trim().is_empty()).count()
    }
}

impl<S: BoardStore> Board<S> {
    pub fn snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            cells: catalog::cells().to_vec(),
            values: self.values().clone(),
        }
    }
}
