pub mod assist;
pub mod board;
pub mod events;
pub mod layout;
pub mod prompt;
pub mod snapshot;
pub mod store;

pub use harada_core::{catalog, CellDefinition, CellRole};
