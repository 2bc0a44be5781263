//! Assist requests and in-flight gating.
//!
//! A help request is validated against the board before any network call.
//! [`RequestGate`] allows one assist and one export in flight at a time and
//! drops suggestions whose cell is no longer selected when they arrive.

use harada_core::{catalog, CellRole};

use crate::board::{Board, BoardError};
use crate::prompt;
use crate::store::{BoardStore, StoreError};

/// A help request rejected before it reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoSelection,
    EmptyQuestion,
    UnknownCell(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoSelection => write!(f, "Please select a cell first"),
            ValidationError::EmptyQuestion => write!(f, "Please enter what you need help with"),
            ValidationError::UnknownCell(id) => write!(f, "Unknown cell '{}'", id),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Everything a generation backend needs to suggest text for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistRequest {
    pub cell_id: String,
    pub role: CellRole,
    pub existing_text: String,
    pub user_question: String,
}

impl AssistRequest {
    /// Build a request for `cell_id`, resolving its role from the catalog.
    pub fn new(
        cell_id: &str,
        existing_text: impl Into<String>,
        user_question: &str,
    ) -> Result<Self, ValidationError> {
        let role = catalog::role_of(cell_id)
            .ok_or_else(|| ValidationError::UnknownCell(cell_id.to_string()))?;
        let question = user_question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }
        Ok(Self {
            cell_id: cell_id.to_string(),
            role,
            existing_text: existing_text.into(),
            user_question: question.to_string(),
        })
    }

    /// The instruction text for a generation service.
    pub fn prompt(&self) -> String {
        prompt::build_cell_help_prompt(
            &self.cell_id,
            self.role.as_str(),
            &self.existing_text,
            &self.user_question,
        )
    }
}

impl<S: BoardStore> Board<S> {
    /// Validate a help question against the current selection.
    pub fn assist_request(&self, question: &str) -> Result<AssistRequest, ValidationError> {
        let cell_id = self.selected().ok_or(ValidationError::NoSelection)?;
        let existing = self.value(cell_id).unwrap_or_default();
        AssistRequest::new(cell_id, existing, question)
    }
}

/// A second request of a kind already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    AssistInFlight,
    ExportInFlight,
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateError::AssistInFlight => write!(f, "A suggestion is already being generated"),
            GateError::ExportInFlight => write!(f, "An export is already running"),
        }
    }
}

impl std::error::Error for GateError {}

/// Proof that an assist request was admitted. Consumed on completion.
#[derive(Debug)]
pub struct AssistTicket {
    cell_id: String,
}

impl AssistTicket {
    pub fn cell_id(&self) -> &str {
        &self.cell_id
    }
}

/// Proof that an export request was admitted.
#[derive(Debug)]
pub struct ExportTicket {
    _private: (),
}

/// What happened to a finished assist request.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistOutcome<E> {
    /// Suggestion written to the cell and saved.
    Applied { cell_id: String },
    /// Suggestion written to the cell but the store rejected the save.
    AppliedUnsaved { cell_id: String, error: StoreError },
    /// Selection moved on before the suggestion arrived.
    Discarded { cell_id: String },
    /// The service failed. The board was not touched.
    Failed(E),
}

/// Tracks in-flight assist and export requests.
#[derive(Debug, Default)]
pub struct RequestGate {
    assist: Option<String>,
    export: bool,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assist_in_flight(&self) -> bool {
        self.assist.is_some()
    }

    pub fn export_in_flight(&self) -> bool {
        self.export
    }

    pub fn begin_assist(&mut self, request: &AssistRequest) -> Result<AssistTicket, GateError> {
        if self.assist.is_some() {
            return Err(GateError::AssistInFlight);
        }
        self.assist = Some(request.cell_id.clone());
        Ok(AssistTicket {
            cell_id: request.cell_id.clone(),
        })
    }

    /// Settle an assist request against the board as it is now.
    pub fn finish_assist<S: BoardStore, E>(
        &mut self,
        ticket: AssistTicket,
        result: Result<String, E>,
        board: &mut Board<S>,
    ) -> AssistOutcome<E> {
        self.assist = None;
        let cell_id = ticket.cell_id;
        let text = match result {
            Ok(text) => text,
            Err(e) => return AssistOutcome::Failed(e),
        };
        match board.apply_assist_result(&cell_id, text) {
            Ok(()) => AssistOutcome::Applied { cell_id },
            Err(BoardError::Storage(error)) => AssistOutcome::AppliedUnsaved { cell_id, error },
            Err(_) => AssistOutcome::Discarded { cell_id },
        }
    }

    pub fn begin_export(&mut self) -> Result<ExportTicket, GateError> {
        if self.export {
            return Err(GateError::ExportInFlight);
        }
        self.export = true;
        Ok(ExportTicket { _private: () })
    }

    pub fn finish_export(&mut self, _ticket: ExportTicket) {
        self.export = false;
    }
}
