// Board operations shared by one-shot commands and the repl.

use std::path::{Path, PathBuf};

use harada_client::{ExportClient, SuggestionBackend};
use harada_config::{Settings, StorageBackend};
use harada_core::catalog;
use harada_engine::assist::{AssistOutcome, RequestGate};
use harada_engine::board::Board;
use harada_engine::events::BoardEvent;
use harada_engine::prompt;
use harada_engine::store::{BoardStore, MemoryStore, StoreError};
use harada_io::{FileStore, SqliteStore};

use crate::exit_codes::{
    assist_exit_code, export_exit_code, EXIT_ASSIST_DISCARDED, EXIT_EXPORT_NOT_CONFIGURED,
    EXIT_EXPORT_WRITE, EXIT_STORE_WRITE,
};
use crate::CliError;

pub type CliBoard = Board<Box<dyn BoardStore>>;

/// Open the configured store backend.
pub fn open_store(settings: &Settings) -> Result<Box<dyn BoardStore>, StoreError> {
    let dir = settings.store_dir();
    let store: Box<dyn BoardStore> = match settings.storage_backend {
        StorageBackend::Files => Box::new(FileStore::open(&dir)?),
        StorageBackend::Sqlite => Box::new(SqliteStore::open_in(&dir)?),
    };
    tracing::debug!(dir = %dir.display(), "opened board store");
    Ok(store)
}

/// Open the board for viewing. An unusable store falls back to memory so
/// read-only commands still show the empty board.
pub fn open_board(settings: &Settings) -> CliBoard {
    let store = open_store(settings).unwrap_or_else(|e| {
        eprintln!("warning: store unavailable ({}); changes will not be saved", e);
        Box::new(MemoryStore::new()) as Box<dyn BoardStore>
    });
    board_over(store)
}

/// Open the board for a command that changes it. Fails instead of
/// falling back to memory.
pub fn open_board_for_edit(settings: &Settings) -> Result<CliBoard, CliError> {
    let store = open_store(settings).map_err(|e| CliError {
        code: EXIT_STORE_WRITE,
        message: format!("store unavailable ({}); nothing was changed", e),
        hint: Some("check storage.dir or HARADA_STORE_DIR (harada status)".to_string()),
    })?;
    Ok(board_over(store))
}

fn board_over(store: Box<dyn BoardStore>) -> CliBoard {
    let mut board = Board::open(store);
    if let Some(e) = board.load_warning() {
        eprintln!("warning: saved board not loaded ({}); starting from defaults", e);
    }
    board.subscribe(Box::new(log_event));
    board
}

fn log_event(event: &BoardEvent) {
    match event {
        BoardEvent::CellChanged(e) => tracing::debug!(cell = %e.cell_id, len = e.text.len(), "cell changed"),
        BoardEvent::SelectionChanged(e) => {
            tracing::debug!(previous = ?e.previous, current = ?e.current, "selection changed")
        }
        BoardEvent::BoardReset(e) => tracing::info!(all_data = e.all_data, "board reset"),
        BoardEvent::PersistFailed(e) => {
            tracing::debug!(op = e.op.as_str(), error = %e.error, "store write failed")
        }
    }
}

/// Details for one cell, as shown when it is selected.
pub fn describe_cell<S: BoardStore>(board: &Board<S>, id: &str) -> Option<String> {
    let cell = catalog::cell(id)?;
    let mut out = format!("{}  {}", cell.id, cell.role.label());
    if cell.row_span > 1 || cell.col_span > 1 {
        out.push_str(&format!(
            "  (rows {}-{}, cols {}-{})",
            cell.row,
            cell.row + cell.row_span - 1,
            cell.col,
            cell.col + cell.col_span - 1
        ));
    } else {
        out.push_str(&format!("  (row {}, col {})", cell.row, cell.col));
    }
    out.push('\n');
    let text = board.value(id).unwrap_or_default();
    if text.is_empty() {
        out.push_str("Text: (empty)\n");
    } else {
        out.push_str(&format!("Text: {}\n", text));
    }
    out.push_str(&format!("Holds {}\n", prompt::role_description(cell.role)));
    Some(out)
}

/// Ask the backend for a suggestion for the selected cell and settle it.
pub fn ask<S: BoardStore>(
    board: &mut Board<S>,
    gate: &mut RequestGate,
    backend: &dyn SuggestionBackend,
    question: &str,
) -> Result<String, CliError> {
    let request = board.assist_request(question).map_err(CliError::validation)?;
    let ticket = gate.begin_assist(&request).map_err(CliError::busy)?;

    tracing::info!(cell = %request.cell_id, role = request.role.as_str(), "requesting suggestion");
    let result = backend.suggest(&request);

    match gate.finish_assist(ticket, result, board) {
        AssistOutcome::Applied { cell_id } => Ok(board.value(&cell_id).unwrap_or_default().to_string()),
        AssistOutcome::AppliedUnsaved { cell_id, error } => Err(CliError {
            code: EXIT_STORE_WRITE,
            message: format!("suggestion written to {} but not saved: {}", cell_id, error),
            hint: Some("check the store directory (harada status)".to_string()),
        }),
        AssistOutcome::Discarded { cell_id } => Err(CliError {
            code: EXIT_ASSIST_DISCARDED,
            message: format!("suggestion for {} discarded: selection changed", cell_id),
            hint: None,
        }),
        AssistOutcome::Failed(e) => Err(CliError {
            code: assist_exit_code(&e),
            message: format!("could not get a suggestion: {}", e),
            hint: None,
        }),
    }
}

/// Render the board remotely and write the document.
///
/// `output` may be a file or an existing directory; without it the
/// document lands in the current directory under the service's filename.
pub fn export<S: BoardStore>(
    board: &Board<S>,
    gate: &mut RequestGate,
    settings: &Settings,
    output: Option<&Path>,
) -> Result<PathBuf, CliError> {
    let base_url = settings.service_base_url().ok_or_else(|| CliError {
        code: EXIT_EXPORT_NOT_CONFIGURED,
        message: "export service not configured".to_string(),
        hint: Some(format!("set \"service.baseUrl\" in {}", Settings::config_path_display())),
    })?;

    let ticket = gate.begin_export().map_err(CliError::busy)?;
    let result = ExportClient::new(base_url)
        .map(|c| c.with_default_filename(&settings.export_default_filename))
        .and_then(|c| c.export(&board.snapshot()));
    gate.finish_export(ticket);

    let doc = result.map_err(|e| CliError {
        code: export_exit_code(&e),
        message: format!("export failed: {}", e),
        hint: None,
    })?;

    let path = match output {
        Some(p) if p.is_dir() => p.join(&doc.filename),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(&doc.filename),
    };

    std::fs::write(&path, &doc.bytes).map_err(|e| CliError {
        code: EXIT_EXPORT_WRITE,
        message: format!("{}: {}", path.display(), e),
        hint: None,
    })?;
    tracing::info!(path = %path.display(), bytes = doc.bytes.len(), "export written");
    Ok(path)
}
