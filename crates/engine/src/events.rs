//! Event types for board change notifications.
//!
//! The board emits these after each state transition so a frontend can
//! redraw or warn the user without polling. The test collector records
//! them for ordering assertions.

use crate::store::StoreError;

/// Events emitted by [`crate::board::Board`].
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// A cell's text changed (edit or applied suggestion).
    CellChanged(CellChangedEvent),

    /// The selected cell changed. Never persisted.
    SelectionChanged(SelectionChangedEvent),

    /// Values went back to catalog defaults.
    BoardReset(BoardResetEvent),

    /// A store read or write failed. The in-memory board is still authoritative.
    PersistFailed(PersistFailedEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellChangedEvent {
    pub cell_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChangedEvent {
    pub previous: Option<String>,
    pub current: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardResetEvent {
    /// True when the onboarding marker was erased too.
    pub all_data: bool,
}

/// Which store operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    Save,
    Erase,
    Marker,
}

impl PersistOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistOp::Save => "save",
            PersistOp::Erase => "erase",
            PersistOp::Marker => "marker",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistFailedEvent {
    pub op: PersistOp,
    pub error: StoreError,
}

/// Callback type for receiving board events.
pub type EventCallback = Box<dyn FnMut(&BoardEvent) + Send>;

/// Simple event collector for testing.
#[derive(Default)]
pub struct EventCollector {
    events: Vec<BoardEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BoardEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter to only CellChanged events.
    pub fn cells_changed(&self) -> Vec<&CellChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BoardEvent::CellChanged(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Filter to only PersistFailed events.
    pub fn persist_failures(&self) -> Vec<&PersistFailedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BoardEvent::PersistFailed(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}
