//! Clients for the hosted Harada services.
//!
//! - [`assist`]: suggested text for one cell (hosted service or chat API)
//! - [`export`]: board PDF rendering
//!
//! All calls are blocking with a 60s timeout. A failed call never touches
//! the board.

pub mod assist;
pub mod error;
pub mod export;
mod http;

pub use assist::{backend_for, ChatBackend, ServiceBackend, SuggestionBackend};
pub use error::ClientError;
pub use export::{filename_from_disposition, ExportClient, ExportedDocument};
