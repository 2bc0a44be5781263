//! Board state machine.
//!
//! Holds the text of every catalog cell plus the current selection, and
//! keeps the persistent store in step with the in-memory values. The
//! in-memory board is always authoritative: a failed write is reported and
//! retried on [`Board::flush`], never rolled back.

use std::collections::BTreeMap;

use harada_core::{catalog, CellDefinition};

use crate::events::{
    BoardEvent, BoardResetEvent, CellChangedEvent, EventCallback, PersistFailedEvent, PersistOp,
    SelectionChangedEvent,
};
use crate::store::{BoardStore, StoreError, BOARD_KEY, ONBOARDED_KEY, ONBOARDED_VALUE};

/// Error from a board operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardError {
    /// The id is not in the catalog. Nothing was changed.
    UnknownCell(String),
    /// An assist result arrived for a cell that is no longer selected.
    NotSelected {
        cell_id: String,
        selected: Option<String>,
    },
    /// The store rejected a write. The in-memory change was applied.
    Storage(StoreError),
}

impl BoardError {
    /// True when the requested change was still applied in memory.
    pub fn is_applied(&self) -> bool {
        matches!(self, BoardError::Storage(_))
    }
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::UnknownCell(id) => write!(f, "Unknown cell '{}'", id),
            BoardError::NotSelected { cell_id, selected } => match selected {
                Some(current) => write!(
                    f,
                    "Suggestion for '{}' discarded: '{}' is selected now",
                    cell_id, current
                ),
                None => write!(f, "Suggestion for '{}' discarded: no cell is selected", cell_id),
            },
            BoardError::Storage(e) => write!(f, "Change kept but not saved: {}", e),
        }
    }
}

impl std::error::Error for BoardError {}

impl From<StoreError> for BoardError {
    fn from(e: StoreError) -> Self {
        BoardError::Storage(e)
    }
}

/// Store work still owed after a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Save,
    Erase,
}

/// One editing session over a store.
pub struct Board<S: BoardStore> {
    store: S,
    values: BTreeMap<String, String>,
    selected: Option<String>,
    pending: Pending,
    /// Onboarding marker still to be removed after a failed reset.
    forget_pending: bool,
    load_warning: Option<StoreError>,
    listeners: Vec<EventCallback>,
}

impl<S: BoardStore> Board<S> {
    /// Load the board from `store`, merged over catalog defaults.
    ///
    /// A missing, unreadable or corrupt record is not an error: the board
    /// starts from defaults and the problem is kept in [`Board::load_warning`].
    pub fn open(store: S) -> Self {
        let (values, load_warning) = load_values(&store);
        if let Some(e) = &load_warning {
            log::debug!("Board record not loaded, using defaults: {}", e);
        }
        Self {
            store,
            values,
            selected: None,
            pending: Pending::None,
            forget_pending: false,
            load_warning,
            listeners: Vec::new(),
        }
    }

    /// Problem encountered while loading, if any.
    pub fn load_warning(&self) -> Option<&StoreError> {
        self.load_warning.as_ref()
    }

    /// Register an observer for board events.
    pub fn subscribe(&mut self, callback: EventCallback) {
        self.listeners.push(callback);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_cell(&self) -> Option<&'static CellDefinition> {
        self.selected.as_deref().and_then(catalog::cell)
    }

    /// True when the store is behind the in-memory board.
    pub fn is_dirty(&self) -> bool {
        self.pending != Pending::None || self.forget_pending
    }

    /// Set a cell's text and persist the whole board.
    pub fn set_cell_value(&mut self, id: &str, text: impl Into<String>) -> Result<(), BoardError> {
        if !catalog::contains(id) {
            return Err(BoardError::UnknownCell(id.to_string()));
        }
        let text = text.into();
        self.values.insert(id.to_string(), text.clone());
        self.emit(BoardEvent::CellChanged(CellChangedEvent {
            cell_id: id.to_string(),
            text,
        }));
        self.save()
    }

    /// Change the selection. Not persisted.
    pub fn select_cell(&mut self, id: Option<&str>) -> Result<(), BoardError> {
        if let Some(id) = id {
            if !catalog::contains(id) {
                return Err(BoardError::UnknownCell(id.to_string()));
            }
        }
        let current = id.map(str::to_string);
        if current == self.selected {
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.selected, current.clone());
        self.emit(BoardEvent::SelectionChanged(SelectionChangedEvent { previous, current }));
        Ok(())
    }

    /// Restore catalog defaults and erase the stored board record.
    pub fn reset_board(&mut self) -> Result<(), BoardError> {
        self.reset(false)
    }

    /// Reset the board and also forget that the user has onboarded.
    pub fn reset_all_data(&mut self) -> Result<(), BoardError> {
        self.reset(true)
    }

    /// Write a generated suggestion into the cell it was requested for.
    ///
    /// Rejected unless `id` is still the selected cell. The previous text
    /// is overwritten.
    pub fn apply_assist_result(&mut self, id: &str, text: impl Into<String>) -> Result<(), BoardError> {
        if self.selected.as_deref() != Some(id) {
            log::debug!("Discarding stale suggestion for {}", id);
            return Err(BoardError::NotSelected {
                cell_id: id.to_string(),
                selected: self.selected.clone(),
            });
        }
        self.set_cell_value(id, text)
    }

    /// Retry any store work left over from a failed write.
    pub fn flush(&mut self) -> Result<(), BoardError> {
        let board = match self.pending {
            Pending::None => Ok(()),
            Pending::Save => self.save(),
            Pending::Erase => self.erase(),
        };
        let marker = if self.forget_pending {
            self.forget_onboarding()
        } else {
            Ok(())
        };
        board.and(marker)
    }

    /// Whether onboarding has been completed before.
    pub fn is_returning_user(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(ONBOARDED_KEY)?.is_some())
    }

    /// Record that onboarding has been completed.
    pub fn mark_onboarded(&mut self) -> Result<(), StoreError> {
        match self.store.set(ONBOARDED_KEY, ONBOARDED_VALUE) {
            Ok(()) => {
                self.forget_pending = false;
                Ok(())
            }
            Err(e) => {
                self.report(PersistOp::Marker, &e);
                Err(e)
            }
        }
    }

    fn reset(&mut self, all_data: bool) -> Result<(), BoardError> {
        self.values = catalog::defaults();
        let erased = self.erase();
        let marker = if all_data {
            self.forget_onboarding()
        } else {
            Ok(())
        };
        self.emit(BoardEvent::BoardReset(BoardResetEvent { all_data }));
        erased.and(marker)
    }

    fn forget_onboarding(&mut self) -> Result<(), BoardError> {
        match self.store.remove(ONBOARDED_KEY) {
            Ok(()) => {
                self.forget_pending = false;
                Ok(())
            }
            Err(e) => {
                self.forget_pending = true;
                self.report(PersistOp::Marker, &e);
                Err(BoardError::Storage(e))
            }
        }
    }

    fn save(&mut self) -> Result<(), BoardError> {
        let result = serde_json::to_string(&self.values)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
            .and_then(|json| self.store.set(BOARD_KEY, &json));
        self.settle(PersistOp::Save, Pending::Save, result)
    }

    fn erase(&mut self) -> Result<(), BoardError> {
        let result = self.store.remove(BOARD_KEY);
        self.settle(PersistOp::Erase, Pending::Erase, result)
    }

    fn settle(
        &mut self,
        op: PersistOp,
        on_failure: Pending,
        result: Result<(), StoreError>,
    ) -> Result<(), BoardError> {
        match result {
            Ok(()) => {
                self.pending = Pending::None;
                Ok(())
            }
            Err(e) => {
                self.pending = on_failure;
                self.report(op, &e);
                Err(BoardError::Storage(e))
            }
        }
    }

    fn report(&mut self, op: PersistOp, error: &StoreError) {
        log::warn!("Board {} failed: {}", op.as_str(), error);
        self.emit(BoardEvent::PersistFailed(PersistFailedEvent {
            op,
            error: error.clone(),
        }));
    }

    fn emit(&mut self, event: BoardEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

fn load_values<S: BoardStore>(store: &S) -> (BTreeMap<String, String>, Option<StoreError>) {
    let mut values = catalog::defaults();

    let raw = match store.get(BOARD_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (values, None),
        Err(e) => return (values, Some(e)),
    };

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Object(map)) => {
            for (id, value) in map {
                match value {
                    serde_json::Value::String(text) if values.contains_key(&id) => {
                        values.insert(id, text);
                    }
                    _ => log::debug!("Dropping stored entry '{}'", id),
                }
            }
            (values, None)
        }
        Ok(_) => (
            values,
            Some(StoreError::Corrupt("board record is not a JSON object".to_string())),
        ),
        Err(e) => (values, Some(StoreError::Corrupt(e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventCollector;
    use crate::store::MemoryStore;
    use std::sync::{Arc, Mutex};

    fn collect(board: &mut Board<MemoryStore>) -> Arc<Mutex<EventCollector>> {
        let collector = Arc::new(Mutex::new(EventCollector::new()));
        let sink = Arc::clone(&collector);
        board.subscribe(Box::new(move |e| sink.lock().unwrap().push(e.clone())));
        collector
    }

    #[test]
    fn test_open_empty_store_gives_defaults() {
        let board = Board::open(MemoryStore::new());
        assert_eq!(board.values(), &catalog::defaults());
        assert!(board.selected().is_none());
        assert!(board.load_warning().is_none());
    }

    #[test]
    fn test_stored_values_win_per_key() {
        let store = MemoryStore::new().with_entry(BOARD_KEY, r#"{"goal":"Run a marathon"}"#);
        let board = Board::open(store);
        assert_eq!(board.value("goal"), Some("Run a marathon"));
        assert_eq!(board.value("r1c1"), Some(""));
        assert_eq!(board.values().len(), 73);
    }

    #[test]
    fn test_partial_recovery_drops_bad_entries() {
        let store = MemoryStore::new().with_entry(
            BOARD_KEY,
            r#"{"r1c1":"ok","r5c5":"absorbed","r1c2":42,"stray":"x"}"#,
        );
        let board = Board::open(store);
        assert_eq!(board.value("r1c1"), Some("ok"));
        assert_eq!(board.value("r1c2"), Some(""));
        assert_eq!(board.value("r5c5"), None);
        assert_eq!(board.value("stray"), None);
        assert!(board.load_warning().is_none());
    }

    #[test]
    fn test_corrupt_record_falls_back() {
        let store = MemoryStore::new().with_entry(BOARD_KEY, "{not json");
        let board = Board::open(store);
        assert_eq!(board.values(), &catalog::defaults());
        assert!(matches!(board.load_warning(), Some(StoreError::Corrupt(_))));

        let store = MemoryStore::new().with_entry(BOARD_KEY, "[1,2]");
        let board = Board::open(store);
        assert!(matches!(board.load_warning(), Some(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_unreadable_store_falls_back() {
        let mut store = MemoryStore::new().with_entry(BOARD_KEY, r#"{"goal":"x"}"#);
        store.set_fail_reads(true);
        let board = Board::open(store);
        assert_eq!(board.value("goal"), Some(""));
        assert!(matches!(board.load_warning(), Some(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let mut board = Board::open(MemoryStore::new());
        board.set_cell_value("r2c2", "Fast").unwrap();
        let reopened = Board::open(board.into_store());
        assert_eq!(reopened.value("r2c2"), Some("Fast"));
    }

    #[test]
    fn test_unknown_cell_rejected() {
        let mut board = Board::open(MemoryStore::new());
        let err = board.set_cell_value("r5c5", "x").unwrap_err();
        assert_eq!(err, BoardError::UnknownCell("r5c5".into()));
        assert!(board.store().raw(BOARD_KEY).is_none());
        assert!(board.select_cell(Some("zzz")).is_err());
    }

    #[test]
    fn test_selection_not_persisted() {
        let mut board = Board::open(MemoryStore::new());
        board.select_cell(Some("goal")).unwrap();
        assert_eq!(board.selected(), Some("goal"));
        assert!(board.store().raw(BOARD_KEY).is_none());
        let reopened = Board::open(board.into_store());
        assert!(reopened.selected().is_none());
    }

    #[test]
    fn test_reset_board_erases_record() {
        let mut board = Board::open(MemoryStore::new().with_entry(ONBOARDED_KEY, ONBOARDED_VALUE));
        board.set_cell_value("goal", "Win").unwrap();
        board.reset_board().unwrap();
        assert_eq!(board.values(), &catalog::defaults());
        assert!(board.store().raw(BOARD_KEY).is_none());
        assert!(board.is_returning_user().unwrap());
    }

    #[test]
    fn test_reset_twice_same_as_once() {
        let mut board = Board::open(MemoryStore::new());
        board.set_cell_value("goal", "Win").unwrap();
        board.reset_board().unwrap();
        let once = board.values().clone();
        board.reset_board().unwrap();
        assert_eq!(board.values(), &once);
        assert!(board.store().raw(BOARD_KEY).is_none());
    }

    #[test]
    fn test_reset_all_data_forgets_onboarding() {
        let mut board = Board::open(MemoryStore::new());
        board.mark_onboarded().unwrap();
        assert!(board.is_returning_user().unwrap());
        board.set_cell_value("r1c1", "x").unwrap();
        board.reset_all_data().unwrap();
        assert!(!board.is_returning_user().unwrap());
        assert!(board.store().raw(BOARD_KEY).is_none());
    }

    #[test]
    fn test_assist_result_requires_selection() {
        let mut board = Board::open(MemoryStore::new());
        board.select_cell(Some("r2c2")).unwrap();
        let err = board.apply_assist_result("r2c5", "Strong").unwrap_err();
        assert!(matches!(err, BoardError::NotSelected { .. }));
        assert_eq!(board.value("r2c5"), Some(""));

        board.apply_assist_result("r2c2", "Strong").unwrap();
        assert_eq!(board.value("r2c2"), Some("Strong"));
    }

    #[test]
    fn test_assist_result_overwrites() {
        let mut board = Board::open(MemoryStore::new());
        board.set_cell_value("goal", "old text").unwrap();
        board.select_cell(Some("goal")).unwrap();
        board.apply_assist_result("goal", "new text").unwrap();
        assert_eq!(board.value("goal"), Some("new text"));
    }

    #[test]
    fn test_write_failure_keeps_memory_and_flushes_later() {
        let mut board = Board::open(MemoryStore::new());
        let events = collect(&mut board);
        board.store_mut().set_fail_writes(true);

        let err = board.set_cell_value("r1c1", "typed").unwrap_err();
        assert!(err.is_applied());
        assert_eq!(board.value("r1c1"), Some("typed"));
        assert!(board.is_dirty());
        assert_eq!(events.lock().unwrap().persist_failures().len(), 1);

        board.store_mut().set_fail_writes(false);
        board.flush().unwrap();
        assert!(!board.is_dirty());
        let reopened = Board::open(board.into_store());
        assert_eq!(reopened.value("r1c1"), Some("typed"));
    }

    #[test]
    fn test_failed_erase_retried_on_flush() {
        let mut board = Board::open(MemoryStore::new());
        board.set_cell_value("goal", "Win").unwrap();
        board.store_mut().set_fail_writes(true);
        assert!(board.reset_board().is_err());
        assert_eq!(board.values(), &catalog::defaults());

        board.store_mut().set_fail_writes(false);
        board.flush().unwrap();
        assert!(board.store().raw(BOARD_KEY).is_none());
    }

    #[test]
    fn test_failed_marker_removal_retried_on_flush() {
        let store = MemoryStore::new().with_entry(ONBOARDED_KEY, ONBOARDED_VALUE);
        let mut board = Board::open(store);
        board.store_mut().set_fail_writes(true);
        assert!(board.reset_all_data().is_err());
        assert!(board.is_dirty());
        assert!(board.flush().is_err());

        board.store_mut().set_fail_writes(false);
        board.flush().unwrap();
        assert!(!board.is_dirty());
        assert!(board.store().raw(ONBOARDED_KEY).is_none());
        assert!(!board.is_returning_user().unwrap());
    }

    #[test]
    fn test_events_emitted() {
        let mut board = Board::open(MemoryStore::new());
        let events = collect(&mut board);
        board.select_cell(Some("r1c1")).unwrap();
        board.select_cell(Some("r1c1")).unwrap(); // unchanged, no event
        board.set_cell_value("r1c1", "a").unwrap();
        board.reset_all_data().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events.events()[0], BoardEvent::SelectionChanged(_)));
        assert_eq!(events.cells_changed()[0].text, "a");
        assert_eq!(
            events.events()[2],
            BoardEvent::BoardReset(BoardResetEvent { all_data: true })
        );
    }
}
