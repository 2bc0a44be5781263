//! Harada service wire format.
//!
//! JSON bodies exchanged with the hosted web service: the cell-help
//! recommendation endpoint and the board PDF export endpoint. Field names
//! are camelCase to match the service.
//!
//! # Usage
//!
//! ```ignore
//! use harada_protocol::{CellHelpRequest, CellHelpResponse};
//!
//! let body = CellHelpRequest::new("r2c2", "section", "Fast", "make it measurable");
//! let json = serde_json::to_string(&body)?;
//! let reply: CellHelpResponse = serde_json::from_str(&response_text)?;
//! ```

use std::collections::BTreeMap;

use harada_core::{CellDefinition, CellRole};
use serde::{Deserialize, Serialize};

/// Path of the cell-help endpoint, relative to the service base URL.
pub const RECOMMENDATIONS_PATH: &str = "/api/recommendations";

/// Path of the PDF export endpoint, relative to the service base URL.
pub const GENERATE_PDF_PATH: &str = "/api/generate-pdf";

/// Filename used when the export response does not suggest one.
pub const DEFAULT_EXPORT_FILENAME: &str = "harada-board.pdf";

// =============================================================================
// Cell help
// =============================================================================

/// Request body for a cell-help suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "cell-help", rename_all = "camelCase")]
pub struct CellHelpRequest {
    pub help_question: String,
    pub cell_variant: String,
    pub existing_content: String,
    pub cell_id: String,
}

impl CellHelpRequest {
    pub fn new(cell_id: &str, cell_variant: &str, existing_content: &str, help_question: &str) -> Self {
        Self {
            help_question: help_question.to_string(),
            cell_variant: cell_variant.to_string(),
            existing_content: existing_content.to_string(),
            cell_id: cell_id.to_string(),
        }
    }
}

/// Response body from the cell-help endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellHelpResponse {
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// =============================================================================
// Export
// =============================================================================

/// A catalog cell as the export renderer expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCell {
    pub id: String,
    pub row: u8,
    pub col: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<CellRole>,
    pub initial_text: String,
}

impl From<&CellDefinition> for WireCell {
    fn from(cell: &CellDefinition) -> Self {
        let span = |n: u8| if n > 1 { Some(n) } else { None };
        Self {
            id: cell.id.clone(),
            row: cell.row,
            col: cell.col,
            row_span: span(cell.row_span),
            col_span: span(cell.col_span),
            variant: match cell.role {
                CellRole::Plain => None,
                role => Some(role),
            },
            initial_text: cell.initial_text.clone(),
        }
    }
}

/// Request body for a PDF export of the whole board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "board")]
pub struct ExportRequest {
    pub cells: Vec<WireCell>,
    pub values: BTreeMap<String, String>,
}

impl ExportRequest {
    pub fn new(cells: &[CellDefinition], values: &BTreeMap<String, String>) -> Self {
        Self {
            cells: cells.iter().map(WireCell::from).collect(),
            values: values.clone(),
        }
    }
}
