// Interactive session for `harada repl`.
//
// One board for the whole session, so selection carries between lines
// the way it does in a graphical editor.

use std::io::{self, BufRead, Write};

use harada_client::{ClientError, SuggestionBackend};
use harada_engine::assist::RequestGate;
use harada_engine::board::{Board, BoardError};
use harada_engine::store::BoardStore;

use crate::board_ops;
use crate::render;
use crate::CliError;

const HELP: &str = "\
Commands:
  show                  draw the board
  select <cell>         select a cell (ids: r1c1..r9c9, goal)
  deselect              clear the selection
  get [cell]            print a cell (default: selected)
  set <cell> <text...>  replace a cell's text
  clear <cell>          empty a cell
  ask <question...>     suggest text for the selected cell
  reset                 restore the empty board
  reset-all             restore the board and forget onboarding
  help                  this list
  quit                  leave";

/// Run until `quit` or end of input, then flush pending store work.
pub fn run<S: BoardStore, R: BufRead, W: Write>(
    board: &mut Board<S>,
    backend: &Result<Box<dyn SuggestionBackend>, ClientError>,
    input: &mut R,
    out: &mut W,
    width: usize,
) -> io::Result<()> {
    let mut gate = RequestGate::new();
    let mut line = String::new();

    writeln!(out, "Harada board. Type `help` for commands.")?;
    loop {
        match board.selected() {
            Some(id) => write!(out, "harada [{}]> ", id)?,
            None => write!(out, "harada> ")?,
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        let result = match command {
            "quit" | "exit" => break,
            "help" | "?" => writeln!(out, "{}", HELP).map_err(CliError::from),
            "show" => write!(out, "{}", render::render_board(board.values(), board.selected(), width))
                .map_err(CliError::from),
            "select" if rest.is_empty() => Err(CliError::usage("usage: select <cell>")),
            "select" => board
                .select_cell(Some(rest))
                .map_err(CliError::board)
                .and_then(|()| {
                    let text = board_ops::describe_cell(board, rest).unwrap_or_default();
                    write!(out, "{}", text).map_err(CliError::from)
                }),
            "deselect" => board.select_cell(None).map_err(CliError::board),
            "get" => {
                let id = if rest.is_empty() { board.selected() } else { Some(rest) };
                match id {
                    None => Err(CliError::usage("usage: get <cell>")),
                    Some(id) => match board.value(id) {
                        Some(text) => writeln!(out, "{}", text).map_err(CliError::from),
                        None => Err(CliError::board(BoardError::UnknownCell(id.to_string()))),
                    },
                }
            }
            "set" => match rest.split_once(char::is_whitespace) {
                Some((id, text)) => board.set_cell_value(id, text.trim()).map_err(CliError::board),
                None if !rest.is_empty() => board.set_cell_value(rest, "").map_err(CliError::board),
                None => Err(CliError::usage("usage: set <cell> <text...>")),
            },
            "clear" if rest.is_empty() => Err(CliError::usage("usage: clear <cell>")),
            "clear" => board.set_cell_value(rest, "").map_err(CliError::board),
            "ask" => board
                .assist_request(rest)
                .map_err(CliError::validation)
                .and_then(|_| match backend {
                    Ok(backend) => board_ops::ask(board, &mut gate, backend.as_ref(), rest),
                    Err(e) => Err(CliError::assist_config(e)),
                })
                .and_then(|text| writeln!(out, "{}", text).map_err(CliError::from)),
            "reset" => board.reset_board().map_err(CliError::board),
            "reset-all" => board.reset_all_data().map_err(CliError::board),
            other => Err(CliError::usage(format!("unknown command '{}' (try `help`)", other))),
        };

        if let Err(e) = result {
            writeln!(out, "error: {}", e.message)?;
            if let Some(hint) = e.hint {
                writeln!(out, "hint:  {}", hint)?;
            }
        }
    }

    if let Err(e) = board.flush() {
        writeln!(out, "error: {}", e)?;
    }
    Ok(())
}
