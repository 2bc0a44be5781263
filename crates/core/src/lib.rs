//! Core board types.
//!
//! The catalog is the single source of truth for which cells exist, where
//! they sit on the 9x9 board, and what role each one plays.

pub mod catalog;

pub use catalog::{CellDefinition, CellRole, Footprint, BOARD_COLS, BOARD_ROWS};
