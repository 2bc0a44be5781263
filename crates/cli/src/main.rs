// Harada CLI - the goal board from a terminal

mod board_ops;
mod exit_codes;
mod onboard;
mod render;
mod repl;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use harada_client::{backend_for, ClientError, ExportClient};
use harada_config::ai::{self, AssistConfigStatus, AssistDiagnostics, ResolvedAssistConfig};
use harada_config::Settings;
use harada_core::catalog;
use harada_engine::assist::{GateError, RequestGate, ValidationError};
use harada_engine::board::BoardError;
use harada_engine::store::StoreError;

use board_ops::CliBoard;
use exit_codes::{
    assist_exit_code, EXIT_ASSIST_DISABLED, EXIT_ASSIST_KEYCHAIN_ERR, EXIT_ASSIST_MISSING_KEY,
    EXIT_ASSIST_NOT_CONFIGURED, EXIT_BUSY, EXIT_ERROR, EXIT_INVALID_REQUEST,
    EXIT_ONBOARD_INCOMPLETE, EXIT_STORE_READ, EXIT_STORE_WRITE, EXIT_SUCCESS, EXIT_UNKNOWN_CELL,
    EXIT_USAGE,
};

/// Environment variable holding the log filter (e.g. `debug`, `harada_io=trace`).
const LOG_ENV: &str = "HARADA_LOG";

#[derive(Parser)]
#[command(name = "harada")]
#[command(about = "Harada Method goal board (9x9) from the terminal")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("HARADA_GIT_HASH"), ")",
        "\nengine:  harada-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("HARADA_TARGET"),
    )
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the board
    #[command(after_help = "\
Examples:
  harada show
  harada show --select goal --width 16
  harada show --json | jq .goal")]
    Show {
        /// Mark this cell as selected
        #[arg(long)]
        select: Option<String>,

        /// Column width in characters
        #[arg(long, default_value_t = render::DEFAULT_WIDTH)]
        width: usize,

        /// Print cell values as a JSON object instead
        #[arg(long)]
        json: bool,
    },

    /// Print one cell's text
    Get {
        /// Cell id (r1c1..r9c9, or goal)
        cell: String,
    },

    /// Replace one cell's text
    #[command(after_help = "\
Examples:
  harada set goal 'Run a marathon under 4 hours'
  harada set r2c2 ''          # clear a cell")]
    Set {
        /// Cell id (r1c1..r9c9, or goal)
        cell: String,

        /// New text (empty clears the cell)
        #[arg(allow_hyphen_values = true)]
        text: String,
    },

    /// Show a cell's role, position and text
    Select {
        /// Cell id (r1c1..r9c9, or goal)
        cell: String,
    },

    /// Ask the assist service to suggest text for a cell
    #[command(after_help = "\
The suggestion replaces the cell's text. Configure a provider first
(see `harada doctor`).

Examples:
  harada assist goal make this measurable
  harada assist r2c2 'what habit supports this?'")]
    Assist {
        /// Cell id (r1c1..r9c9, or goal)
        cell: String,

        /// What you need help with
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Print the prompt an assist request would send, without sending it
    Prompt {
        /// Cell id (r1c1..r9c9, or goal)
        cell: String,

        /// What you need help with
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Clear every cell
    Reset,

    /// Clear every cell and forget that onboarding was completed
    ResetAll,

    /// Render the board as a PDF through the hosted service
    #[command(after_help = "\
Examples:
  harada export
  harada export -o ~/Documents/
  harada export -o my-board.pdf")]
    Export {
        /// Output file or directory (default: service filename in the current directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print the export request body (full catalog and values) as JSON
    Snapshot,

    /// Answer the first-run questions
    Onboard {
        /// Ask again even if onboarding was completed
        #[arg(long)]
        force: bool,
    },

    /// Show store, board and service status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check assist configuration
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Manage assist API keys in the system keychain
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Interactive session (selection persists between commands)
    Repl {
        /// Column width for `show`
        #[arg(long, default_value_t = render::DEFAULT_WIDTH)]
        width: usize,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Store an API key read from stdin
    #[command(after_help = "\
Examples:
  echo \"$OPENAI_API_KEY\" | harada key set openai")]
    Set {
        /// Provider name (e.g. openai)
        provider: String,
    },

    /// Remove a stored API key
    Delete {
        /// Provider name (e.g. openai)
        provider: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Also installs the `log` bridge so library crates show up here.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: harada <command> [options]");
            eprintln!("       harada --help for more information");
            Ok(())
        }
        Some(Commands::Show { select, width, json }) => cmd_show(select, width, json),
        Some(Commands::Get { cell }) => cmd_get(cell),
        Some(Commands::Set { cell, text }) => cmd_set(cell, text),
        Some(Commands::Select { cell }) => cmd_select(cell),
        Some(Commands::Assist { cell, question }) => cmd_assist(cell, question.join(" ")),
        Some(Commands::Prompt { cell, question }) => cmd_prompt(cell, question.join(" ")),
        Some(Commands::Reset) => cmd_reset(false),
        Some(Commands::ResetAll) => cmd_reset(true),
        Some(Commands::Export { output }) => cmd_export(output),
        Some(Commands::Snapshot) => cmd_snapshot(),
        Some(Commands::Onboard { force }) => cmd_onboard(force),
        Some(Commands::Status { json }) => cmd_status(json),
        Some(Commands::Doctor { json }) => cmd_doctor(json),
        Some(Commands::Key { command }) => match command {
            KeyCommands::Set { provider } => cmd_key_set(provider),
            KeyCommands::Delete { provider } => cmd_key_delete(provider),
        },
        Some(Commands::Repl { width }) => cmd_repl(width),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn board(err: BoardError) -> Self {
        match err {
            BoardError::UnknownCell(_) => Self {
                code: EXIT_UNKNOWN_CELL,
                message: err.to_string(),
                hint: Some("cell ids are r1c1..r9c9 (outside the centre block) and goal".to_string()),
            },
            BoardError::NotSelected { .. } => Self {
                code: exit_codes::EXIT_ASSIST_DISCARDED,
                message: err.to_string(),
                hint: None,
            },
            BoardError::Storage(_) => Self {
                code: EXIT_STORE_WRITE,
                message: err.to_string(),
                hint: Some("check the store directory (harada status)".to_string()),
            },
        }
    }

    pub fn store_read(err: StoreError) -> Self {
        Self { code: EXIT_STORE_READ, message: err.to_string(), hint: None }
    }

    pub fn validation(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::UnknownCell(_) => EXIT_UNKNOWN_CELL,
            ValidationError::NoSelection | ValidationError::EmptyQuestion => EXIT_INVALID_REQUEST,
        };
        Self { code, message: err.to_string(), hint: None }
    }

    pub fn busy(err: GateError) -> Self {
        Self { code: EXIT_BUSY, message: err.to_string(), hint: None }
    }

    /// Assist provider could not be set up.
    pub fn assist_config(err: &ClientError) -> Self {
        let hint = match err {
            ClientError::MissingKey => {
                Some("store a key with `harada key set <provider>` or set HARADA_<PROVIDER>_KEY".to_string())
            }
            ClientError::NotConfigured(_) => Some(format!(
                "edit \"assist\" and \"service.baseUrl\" in {}",
                Settings::config_path_display()
            )),
            _ => None,
        };
        Self { code: assist_exit_code(err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self { code: EXIT_ERROR, message: e.to_string(), hint: None }
    }
}

/// Retry any store work the command left behind.
fn finish(mut board: CliBoard) -> Result<(), CliError> {
    board.flush().map_err(CliError::board)
}

fn require_cell(cell: &str) -> Result<(), CliError> {
    if catalog::contains(cell) {
        Ok(())
    } else {
        Err(CliError::board(BoardError::UnknownCell(cell.to_string())))
    }
}

// ============================================================================
// show / get / set / select
// ============================================================================

fn cmd_show(select: Option<String>, width: usize, json: bool) -> Result<(), CliError> {
    if let Some(cell) = &select {
        require_cell(cell)?;
    }
    let board = board_ops::open_board(&Settings::load());

    if json {
        let out = serde_json::to_string_pretty(board.values())
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{}", out);
    } else {
        print!("{}", render::render_board(board.values(), select.as_deref(), width));
    }
    Ok(())
}

fn cmd_get(cell: String) -> Result<(), CliError> {
    let board = board_ops::open_board(&Settings::load());
    match board.value(&cell) {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => Err(CliError::board(BoardError::UnknownCell(cell))),
    }
}

fn cmd_set(cell: String, text: String) -> Result<(), CliError> {
    let mut board = board_ops::open_board_for_edit(&Settings::load())?;
    board.set_cell_value(&cell, text).map_err(CliError::board)?;
    finish(board)
}

fn cmd_select(cell: String) -> Result<(), CliError> {
    let mut board = board_ops::open_board(&Settings::load());
    board.select_cell(Some(&cell)).map_err(CliError::board)?;
    if let Some(text) = board_ops::describe_cell(&board, &cell) {
        print!("{}", text);
    }
    Ok(())
}

// ============================================================================
// assist / prompt
// ============================================================================

fn cmd_assist(cell: String, question: String) -> Result<(), CliError> {
    let settings = Settings::load();
    let mut board = board_ops::open_board_for_edit(&settings)?;
    board.select_cell(Some(&cell)).map_err(CliError::board)?;
    // Reject bad input before touching provider configuration
    board.assist_request(&question).map_err(CliError::validation)?;

    let config = ResolvedAssistConfig::from_settings(&settings);
    if config.status == AssistConfigStatus::Disabled {
        return Err(CliError {
            code: EXIT_ASSIST_DISABLED,
            message: "assist is disabled".to_string(),
            hint: Some(format!(
                "set \"assist\": {{ \"provider\": \"service\" }} in {}",
                Settings::config_path_display()
            )),
        });
    }
    let backend = backend_for(&config).map_err(|e| CliError::assist_config(&e))?;

    let text = board_ops::ask(&mut board, &mut RequestGate::new(), backend.as_ref(), &question)?;
    println!("{}", text);
    finish(board)
}

fn cmd_prompt(cell: String, question: String) -> Result<(), CliError> {
    let mut board = board_ops::open_board(&Settings::load());
    board.select_cell(Some(&cell)).map_err(CliError::board)?;
    let request = board.assist_request(&question).map_err(CliError::validation)?;
    println!("{}", request.prompt());
    Ok(())
}

// ============================================================================
// reset / export / snapshot
// ============================================================================

fn cmd_reset(all_data: bool) -> Result<(), CliError> {
    let mut board = board_ops::open_board_for_edit(&Settings::load())?;
    if all_data {
        board.reset_all_data().map_err(CliError::board)?;
        println!("All data has been reset.");
    } else {
        board.reset_board().map_err(CliError::board)?;
        println!("Board reset.");
    }
    finish(board)
}

fn cmd_export(output: Option<PathBuf>) -> Result<(), CliError> {
    let settings = Settings::load();
    let board = board_ops::open_board(&settings);
    let path = board_ops::export(&board, &mut RequestGate::new(), &settings, output.as_deref())?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_snapshot() -> Result<(), CliError> {
    let board = board_ops::open_board(&Settings::load());
    let body = ExportClient::request_body(&board.snapshot());
    let out = serde_json::to_string_pretty(&body)
        .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
    println!("{}", out);
    Ok(())
}

// ============================================================================
// onboard / status
// ============================================================================

fn cmd_onboard(force: bool) -> Result<(), CliError> {
    let mut board = board_ops::open_board_for_edit(&Settings::load())?;
    let returning = board.is_returning_user().map_err(CliError::store_read)?;
    if returning && !force {
        println!("Onboarding already completed. Use --force to answer again.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let answers = onboard::ask_questions(&mut input, &mut out)?.ok_or_else(|| CliError {
        code: EXIT_ONBOARD_INCOMPLETE,
        message: "onboarding not completed".to_string(),
        hint: Some("answer every question with yes or no".to_string()),
    })?;

    board.mark_onboarded().map_err(|e| CliError::board(BoardError::Storage(e)))?;
    println!();
    for tip in onboard::tips(&answers) {
        println!("{}", tip);
    }
    Ok(())
}

fn cmd_status(json: bool) -> Result<(), CliError> {
    let settings = Settings::load();
    let board = board_ops::open_board(&settings);
    let snapshot = board.snapshot();
    let returning = board.is_returning_user().map_err(CliError::store_read)?;
    let assist = ResolvedAssistConfig::from_settings(&settings);
    let store_dir = settings.store_dir();
    let backend = match settings.storage_backend {
        harada_config::StorageBackend::Files => "files",
        harada_config::StorageBackend::Sqlite => "sqlite",
    };

    if json {
        let out = serde_json::json!({
            "store": store_dir.display().to_string(),
            "backend": backend,
            "filled": snapshot.filled_count(),
            "cells": snapshot.cells.len(),
            "onboarded": returning,
            "service": settings.service_base_url(),
            "assist": {
                "provider": assist.provider.name(),
                "status": assist.status.as_str(),
            },
            "settings": Settings::config_path_display(),
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{}", text);
    } else {
        println!("Store:     {} ({})", store_dir.display(), backend);
        println!("Board:     {}/{} cells filled", snapshot.filled_count(), snapshot.cells.len());
        println!("Onboarded: {}", if returning { "yes" } else { "no" });
        println!("Service:   {}", settings.service_base_url().unwrap_or("(not configured)"));
        println!("Assist:    {} ({})", assist.status.as_str(), assist.provider.name());
        println!("Settings:  {}", Settings::config_path_display());
    }
    Ok(())
}

// ============================================================================
// doctor / key
// ============================================================================

fn cmd_doctor(json: bool) -> Result<(), CliError> {
    let config = ResolvedAssistConfig::load();
    let diag = AssistDiagnostics::from_resolved(&config);

    if json {
        let out = serde_json::json!({
            "schema_version": 1,
            "status": diag.status.as_str(),
            "blocking_reason": diag.blocking_reason,
            "provider": diag.provider,
            "model": diag.model,
            "endpoint": diag.endpoint,
            "key": if diag.key_present { "present" } else { "missing" },
            "key_source": diag.key_source.as_str(),
            "keychain": if diag.keychain_available { "ok" } else { "unavailable" },
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{}", text);
    } else {
        print!("{}", diag);
        if diag.status == AssistConfigStatus::Disabled {
            println!();
            println!("Assist is disabled. To enable:");
            println!("  Set \"assist\".\"provider\" in {}", Settings::config_path_display());
        }
    }

    let reason = || diag.blocking_reason.clone().unwrap_or_default();
    match diag.status {
        AssistConfigStatus::Ready => Ok(()),
        AssistConfigStatus::Disabled => Err(CliError {
            code: EXIT_ASSIST_DISABLED,
            message: "assist is disabled".to_string(),
            hint: None,
        }),
        AssistConfigStatus::MissingKey => Err(CliError {
            code: EXIT_ASSIST_MISSING_KEY,
            message: reason(),
            hint: None,
        }),
        AssistConfigStatus::MissingEndpoint => Err(CliError {
            code: EXIT_ASSIST_NOT_CONFIGURED,
            message: reason(),
            hint: None,
        }),
    }
}

fn keychain_error(msg: String) -> CliError {
    CliError { code: EXIT_ASSIST_KEYCHAIN_ERR, message: msg, hint: None }
}

fn cmd_key_set(provider: String) -> Result<(), CliError> {
    let mut key = String::new();
    io::stdin().lock().read_line(&mut key)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::usage("no key on stdin")
            .with_hint(format!("echo \"$KEY\" | harada key set {}", provider)));
    }
    ai::set_api_key(&provider, key).map_err(keychain_error)?;
    println!("Stored key for {} in the system keychain.", provider);
    Ok(())
}

fn cmd_key_delete(provider: String) -> Result<(), CliError> {
    ai::delete_api_key(&provider).map_err(keychain_error)?;
    println!("Removed key for {}.", provider);
    Ok(())
}

// ============================================================================
// repl
// ============================================================================

fn cmd_repl(width: usize) -> Result<(), CliError> {
    let settings = Settings::load();
    let mut board = board_ops::open_board(&settings);
    let backend = backend_for(&ResolvedAssistConfig::from_settings(&settings));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    repl::run(&mut board, &backend, &mut input, &mut out, width)?;
    Ok(())
}
